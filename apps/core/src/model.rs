use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// One information base from `ibases.v8i`: a unique name plus its connection string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub connection: String,
}

impl Entry {
    pub fn new(name: &str, connection: &str) -> Self {
        Self {
            name: name.to_string(),
            connection: connection.to_string(),
        }
    }
}

/// Run mode passed as the first argument to the platform binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    #[default]
    Designer,
    Enterprise,
}

impl Mode {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Designer => "DESIGNER",
            Self::Enterprise => "ENTERPRISE",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMeta {
    pub id: String,
    pub name: String,
    pub description: String,
    pub path: String,
}

impl ResultMeta {
    pub fn for_entry(entry: &Entry, mode: Mode) -> Self {
        Self {
            id: entry.name.clone(),
            name: entry.name.clone(),
            description: format!("{} {}", mode.as_token(), entry.connection),
            // Synthetic; hosts key result rows on it.
            path: format!("path{}", entry.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub display_name: String,
    pub icon: String,
    pub id: String,
    pub title: String,
}

impl Default for ProviderInfo {
    fn default() -> Self {
        Self {
            display_name: "onec-search-provider".to_string(),
            icon: "1cestart".to_string(),
            id: "OneCSearchProvider".to_string(),
            title: "1C Search".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, Mode, ResultMeta};

    #[test]
    fn meta_embeds_mode_and_connection() {
        let entry = Entry::new("Accounting", "File=\"/srv/acc\";");
        let meta = ResultMeta::for_entry(&entry, Mode::Enterprise);

        assert_eq!(meta.id, "Accounting");
        assert_eq!(meta.description, "ENTERPRISE File=\"/srv/acc\";");
        assert_eq!(meta.path, "pathAccounting");
    }

    #[test]
    fn default_mode_is_designer() {
        assert_eq!(Mode::default(), Mode::Designer);
        assert_eq!(Mode::Designer.to_string(), "DESIGNER");
    }
}
