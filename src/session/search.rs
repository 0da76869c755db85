use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchState {
    pub search_query: String,
}

impl SearchState {
    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
    }
}
