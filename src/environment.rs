use std::collections::HashMap;

/// Shell-side view of the environment. `cd` reads `HOME` and `OLDPWD` from
/// here and records `PWD`/`OLDPWD` after changing directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        // Import all OS environment variables when starting the process
        Self::from_vars(
            std::env::vars_os()
                .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned())),
        )
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Environment {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn home(&self) -> Option<&str> {
        self.get("HOME").filter(|h| !h.is_empty())
    }

    pub fn oldpwd(&self) -> Option<&str> {
        self.get("OLDPWD").filter(|d| !d.is_empty())
    }
}
