pub mod author;
pub mod edition;
pub mod entity;
pub mod key;
pub mod record;
pub mod reply;
pub mod work;

pub use author::Author;
pub use edition::Edition;
pub use entity::{Entity, Redirect};
pub use key::{Key, KeyKind};
pub use record::{ImportAuthor, ImportRecord};
pub use reply::{AuthorReply, EntityReply, EntityStatus, LoadReply};
pub use work::{AuthorRole, Work};
