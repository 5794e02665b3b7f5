/// Naming convention applied to emitted element names and keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingConvention {
    /// Keep names as they appear in the source.
    #[default]
    Original,
    Camel,
    Pascal,
    Kebab,
    Snake,
}

impl NamingConvention {
    pub fn apply(&self, name: &str) -> String {
        if matches!(self, NamingConvention::Original) {
            return name.to_string();
        }

        let words: Vec<&str> = name
            .split([' ', '_', '-'])
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return name.to_string();
        }

        match self {
            NamingConvention::Original => name.to_string(),
            NamingConvention::Camel => {
                let mut out = words[0].to_lowercase();
                for word in &words[1..] {
                    out.push_str(&capitalize(word));
                }
                out
            }
            NamingConvention::Pascal => words.iter().map(|w| capitalize(w)).collect(),
            NamingConvention::Kebab => words
                .iter()
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
                .join("-"),
            NamingConvention::Snake => words
                .iter()
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Makes a string usable as an XML element or attribute name.
///
/// The first character must be a letter or underscore (anything else gets
/// an underscore prefix); remaining characters outside letters, digits,
/// `_`, `-` and `.` are replaced with underscores. An empty name becomes
/// `field`.
pub fn sanitize_xml_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "field".to_string();
    }

    let mut result: String = trimmed
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let starts_valid = result
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if !starts_valid {
        result.insert(0, '_');
    }

    result
}
