use std::fmt;

/// Position in the catalog menu, carried in callback data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationPath {
    Root,
    Category {
        category: String,
    },
    Series {
        category: String,
        series_name: String,
    },
    Season {
        category: String,
        series_name: String,
        season_name: String,
    },
    Episode {
        id: i64,
    },
}

const ROOT: &str = "root";
const CATEGORY: &str = "cat";
const SERIES: &str = "series";
const SEASON: &str = "season";
const EPISODE: &str = "ep";

/// `%` first, so the escape of `_` is not escaped again
fn escape_field(field: &str) -> String {
    field.replace('%', "%25").replace('_', "%5F")
}

fn unescape_field(field: &str) -> Option<String> {
    let mut result = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(pos) = rest.find('%') {
        result.push_str(&rest[..pos]);
        match rest.get(pos..pos + 3)? {
            "%25" => result.push('%'),
            "%5F" => result.push('_'),
            _ => return None,
        }
        rest = &rest[pos + 3..];
    }
    result.push_str(rest);
    Some(result)
}

impl NavigationPath {
    pub fn category(category: impl Into<String>) -> Self {
        NavigationPath::Category {
            category: category.into(),
        }
    }

    pub fn series(category: impl Into<String>, series_name: impl Into<String>) -> Self {
        NavigationPath::Series {
            category: category.into(),
            series_name: series_name.into(),
        }
    }

    pub fn season(
        category: impl Into<String>,
        series_name: impl Into<String>,
        season_name: impl Into<String>,
    ) -> Self {
        NavigationPath::Season {
            category: category.into(),
            series_name: series_name.into(),
            season_name: season_name.into(),
        }
    }

    /// Callback token, e.g. `season_Anime_Naruto_Season 1`
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Inverse of `encode`; `None` for anything it did not produce
    pub fn decode(token: &str) -> Option<Self> {
        if token == ROOT {
            return Some(NavigationPath::Root);
        }
        let (prefix, rest) = token.split_once('_')?;
        let fields = rest
            .split('_')
            .map(unescape_field)
            .collect::<Option<Vec<_>>>()?;
        match (prefix, fields.as_slice()) {
            (CATEGORY, [category]) => Some(Self::category(category)),
            (SERIES, [category, series_name]) => Some(Self::series(category, series_name)),
            (SEASON, [category, series_name, season_name]) => {
                Some(Self::season(category, series_name, season_name))
            }
            (EPISODE, [id]) => id.parse().ok().map(|id| NavigationPath::Episode { id }),
            _ => None,
        }
    }

    /// Screen the Back button leads to. The episode screen has no parent path of
    /// its own: the catalog row knows its season.
    pub fn parent(&self) -> Option<NavigationPath> {
        match self {
            NavigationPath::Root | NavigationPath::Episode { .. } => None,
            NavigationPath::Category { .. } => Some(NavigationPath::Root),
            NavigationPath::Series { category, .. } => Some(Self::category(category)),
            NavigationPath::Season {
                category,
                series_name,
                ..
            } => Some(Self::series(category, series_name)),
        }
    }
}

impl fmt::Display for NavigationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationPath::Root => write!(f, "{}", ROOT),
            NavigationPath::Category { category } => {
                write!(f, "{}_{}", CATEGORY, escape_field(category))
            }
            NavigationPath::Series {
                category,
                series_name,
            } => write!(
                f,
                "{}_{}_{}",
                SERIES,
                escape_field(category),
                escape_field(series_name)
            ),
            NavigationPath::Season {
                category,
                series_name,
                season_name,
            } => write!(
                f,
                "{}_{}_{}_{}",
                SEASON,
                escape_field(category),
                escape_field(series_name),
                escape_field(season_name)
            ),
            NavigationPath::Episode { id } => write!(f, "{}_{}", EPISODE, id),
        }
    }
}
