use once_cell::sync::Lazy;
use regex::Regex;

/// ISBD cataloging title-unit separator punctuation.
const ISBD_UNIT_PUNCT: &str = " : ";

/// Maximum length of a normalized title, in characters.
const NORM_TITLE_LEN: usize = 25;

static RE_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?\(.*\)").unwrap());

// Strips parenthetical blocks wherever they occur; handles one level
// of nesting.
static RE_PARENS_STRIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^\)\(]*|[^\(]*\([^\)]*\)[^\)]*)\)").unwrap());

static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").unwrap());

static RE_LCCN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{0,3}\d{8,10}$").unwrap());

/// Fold a small set of common Latin diacritics to their ASCII base
/// letter. Characters outside the table pass through unchanged.
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ß' => 's',
        'ž' | 'ź' | 'ż' => 'z',
        'š' | 'ś' => 's',
        'ł' => 'l',
        'đ' => 'd',
        'ŕ' | 'ř' => 'r',
        'ť' => 't',
        _ => c,
    }
}

/// Normalize a title into the 25-char fuzzy-bucket form: fold accents,
/// lowercase, drop the connective " and ", drop one leading article,
/// strip parenthetical text, remove all spaces, truncate.
///
/// Used only for bucket membership and title comparison, never for
/// display.
pub fn normalize_title(s: &str) -> String {
    let mut norm: String = s.to_lowercase().chars().map(fold_accent).collect();
    norm = norm.replace(" and ", " ");
    if let Some(rest) = norm.strip_prefix("the ") {
        norm = rest.to_string();
    } else if let Some(rest) = norm.strip_prefix("a ") {
        norm = rest.to_string();
    }
    norm = RE_PARENS.replace_all(&norm, "").into_owned();
    norm.chars()
        .filter(|c| *c != ' ')
        .take(NORM_TITLE_LEN)
        .collect()
}

/// Canonicalize an ISBN to its bare alphanumeric form, or drop it.
///
/// Accepts a 10-character form (nine digits plus a digit or `X` check
/// character) or a 13-digit form. Invalid values return `None`; this
/// function never fails loudly.
pub fn normalize_isbn(isbn: &str) -> Option<String> {
    let stripped: String = isbn
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_uppercase();
    match stripped.len() {
        10 => {
            let (head, check) = stripped.split_at(9);
            let valid = head.chars().all(|c| c.is_ascii_digit())
                && check.chars().all(|c| c.is_ascii_digit() || c == 'X');
            valid.then_some(stripped)
        }
        13 => stripped
            .chars()
            .all(|c| c.is_ascii_digit())
            .then_some(stripped),
        _ => None,
    }
}

/// Canonicalize an LCCN: lowercase, strip blanks, cut at the first
/// revision slash, left-pad the serial to six digits. Values that do
/// not fit the normalized shape are dropped silently.
pub fn normalize_lccn(lccn: &str) -> Option<String> {
    let mut norm: String = lccn
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != ' ')
        .collect();
    if let Some(idx) = norm.find('/') {
        norm.truncate(idx);
    }
    if let Some((prefix, serial)) = norm.split_once('-') {
        norm = format!("{prefix}{serial:0>6}");
    }
    RE_LCCN.is_match(&norm).then_some(norm)
}

/// Split a bare title into (title, subtitle) on its last colon,
/// stripping parenthetical tags. Used for bookseller catalogs which do
/// not pre-separate subtitles.
///
/// Leading title units are rejoined with the ISBD ` : ` separator.
pub fn split_subtitle(full_title: &str) -> (String, Option<String>) {
    let clean = RE_PARENS_STRIP.replace_all(full_title, "");
    let mut units: Vec<&str> = clean.split(':').map(str::trim).collect();
    let subtitle = if units.len() > 1 {
        units.pop().map(str::to_string)
    } else {
        None
    };
    (units.join(ISBD_UNIT_PUNCT), subtitle)
}

/// Extract a four-digit publication year from a free-form publish date.
pub fn publication_year(publish_date: &str) -> Option<i32> {
    RE_YEAR
        .captures(publish_date)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("The Adventures of Tom Sawyer"), "adventuresoftomsawyer");
        assert_eq!(normalize_title("A Tale of Two Cities"), "taleoftwocities");
        assert_eq!(normalize_title("War and Peace"), "warpeace");
        assert_eq!(normalize_title("Dune (Deluxe Edition)"), "dune");
        assert_eq!(normalize_title("Éducation européenne"), "educationeuropeenne");
    }

    #[test]
    fn test_normalize_title_truncates_at_25() {
        let long = "An Extremely Long Title That Goes On And On Forever";
        assert_eq!(normalize_title(long).chars().count(), 25);
    }

    #[test]
    fn test_normalize_isbn() {
        assert_eq!(normalize_isbn("0-441-56959-5"), Some("0441569595".to_string()));
        assert_eq!(normalize_isbn("978 0 441 56959 3"), Some("9780441569593".to_string()));
        assert_eq!(normalize_isbn("155404295x"), Some("155404295X".to_string()));
        assert_eq!(normalize_isbn("not-an-isbn"), None);
        assert_eq!(normalize_isbn("12345"), None);
    }

    #[test]
    fn test_normalize_lccn() {
        assert_eq!(normalize_lccn("96-39190"), Some("96039190".to_string()));
        assert_eq!(normalize_lccn("agr 62000298"), Some("agr62000298".to_string()));
        assert_eq!(normalize_lccn("2001-890 /r99"), Some("2001000890".to_string()));
        assert_eq!(normalize_lccn("invalid"), None);
    }

    #[test]
    fn test_split_subtitle() {
        let (title, subtitle) = split_subtitle("Secrets of the code: the unauthorized guide");
        assert_eq!(title, "Secrets of the code");
        assert_eq!(subtitle.as_deref(), Some("the unauthorized guide"));

        let (title, subtitle) = split_subtitle("Neuromancer");
        assert_eq!(title, "Neuromancer");
        assert!(subtitle.is_none());

        // parenthetical blocks are stripped before the split
        let (title, subtitle) = split_subtitle("Dracula (Annotated): a mystery");
        assert_eq!(title, "Dracula");
        assert_eq!(subtitle.as_deref(), Some("a mystery"));
    }

    #[test]
    fn test_split_subtitle_multiple_colons() {
        let (title, subtitle) = split_subtitle("One: Two: Three");
        assert_eq!(title, "One : Two");
        assert_eq!(subtitle.as_deref(), Some("Three"));
    }

    #[test]
    fn test_publication_year() {
        assert_eq!(publication_year("1984"), Some(1984));
        assert_eq!(publication_year("June 1, 1999"), Some(1999));
        assert_eq!(publication_year("n.d."), None);
    }
}
