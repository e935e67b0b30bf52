use serde::{Deserialize, Serialize};

/// Content ratings the host understands
///
/// Only the US television and film systems are covered, which is what TheTVDB
/// reports for its `rating` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Certification {
    UsTvy,
    UsTvy7,
    UsTvg,
    UsTvpg,
    UsTv14,
    UsTvma,
    UsG,
    UsPg,
    UsPg13,
    UsR,
    UsNc17,
}

impl Certification {
    /// Labels each certification is known by
    fn labels(self) -> &'static [&'static str] {
        match self {
            Certification::UsTvy => &["TV-Y", "TVY"],
            Certification::UsTvy7 => &["TV-Y7", "TVY7", "TV-Y7-FV"],
            Certification::UsTvg => &["TV-G", "TVG"],
            Certification::UsTvpg => &["TV-PG", "TVPG"],
            Certification::UsTv14 => &["TV-14", "TV14"],
            Certification::UsTvma => &["TV-MA", "TVMA"],
            Certification::UsG => &["G", "Rated G"],
            Certification::UsPg => &["PG", "Rated PG"],
            Certification::UsPg13 => &["PG-13", "Rated PG-13"],
            Certification::UsR => &["R", "Rated R"],
            Certification::UsNc17 => &["NC-17", "Rated NC-17"],
        }
    }

    const ALL: [Certification; 11] = [
        Certification::UsTvy,
        Certification::UsTvy7,
        Certification::UsTvg,
        Certification::UsTvpg,
        Certification::UsTv14,
        Certification::UsTvma,
        Certification::UsG,
        Certification::UsPg,
        Certification::UsPg13,
        Certification::UsR,
        Certification::UsNc17,
    ];

    /// Finds the certification for a free-text rating label
    pub fn find(label: &str) -> Option<Certification> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        Self::ALL.into_iter().find(|cert| {
            cert.labels()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(label))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tv_ratings() {
        assert_eq!(Certification::find("TV-PG"), Some(Certification::UsTvpg));
        assert_eq!(Certification::find("tv-14"), Some(Certification::UsTv14));
        assert_eq!(Certification::find("TVMA"), Some(Certification::UsTvma));
        assert_eq!(Certification::find(" pg-13 "), Some(Certification::UsPg13));
    }

    #[test]
    fn test_find_unknown_or_blank() {
        assert_eq!(Certification::find(""), None);
        assert_eq!(Certification::find("   "), None);
        assert_eq!(Certification::find("FSK 12"), None);
    }
}
