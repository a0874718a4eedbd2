/// Prefix of the numbered variables that describe projects.
pub const PROJECT_VAR_PREFIX: &str = "PUBSUB_PROJECT";

/// One `PUBSUB_PROJECTn` variable and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectVar {
    pub name: String,
    pub value: String,
}

pub fn project_var_name(index: usize) -> String {
    format!("{}{}", PROJECT_VAR_PREFIX, index)
}

/// Collects `PUBSUB_PROJECT1`, `PUBSUB_PROJECT2`, ... up to the first absent or
/// empty one. An empty result means `PUBSUB_PROJECT1` itself is missing.
pub fn collect_project_vars<F>(lookup: F) -> Vec<ProjectVar>
where
    F: Fn(&str) -> Option<String>,
{
    (1..)
        .map(|index| {
            let name = project_var_name(index);
            let value = lookup(&name).unwrap_or_default();
            ProjectVar { name, value }
        })
        .take_while(|var| !var.value.is_empty())
        .collect()
}

/// Reads from the process environment; values that are not valid unicode count as absent.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
