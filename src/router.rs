use std::collections::BTreeMap;

pub const DEFAULT_ROUTE: &str = "/regras";

const DEFAULT_ROUTES: &[(&str, &str)] = &[
    ("/", "regras"),
    ("/regras", "regras"),
    ("/times", "times"),
    ("/tatico", "tatico"),
    ("/registro", "registro"),
    ("/cal", "calendario"),
    ("/ranking", "tabela"),
];

/// Outcome of resolving a path. `valid` is false when the requested path was
/// unknown and the default route was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: String,
    pub section: String,
    pub valid: bool,
}

#[derive(Debug, Clone)]
pub struct Router {
    routes: BTreeMap<String, String>,
    default_route: String,
}

impl Default for Router {
    fn default() -> Self {
        let routes = DEFAULT_ROUTES.iter().map(|(p, s)| (p.to_string(), s.to_string())).collect();
        Self { routes, default_route: DEFAULT_ROUTE.to_string() }
    }
}

impl Router {
    /// Custom table. Returns `None` when `default_route` is not one of `routes`.
    pub fn new(routes: BTreeMap<String, String>, default_route: &str) -> Option<Self> {
        routes.contains_key(default_route).then(|| Self { routes, default_route: default_route.to_string() })
    }

    pub fn default_route(&self) -> &str {
        &self.default_route
    }

    pub fn is_known(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Resolve a fragment (`"#/times"`, `"/times"` or empty) to a section.
    pub fn resolve(&self, fragment: &str) -> Resolved {
        let raw = fragment.trim();
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        let wanted = if raw.is_empty() { self.default_route.as_str() } else { raw };
        let valid = self.routes.contains_key(wanted);
        let path = if valid { wanted } else { self.default_route.as_str() };
        let section = self.routes.get(path).cloned().unwrap_or_default();
        Resolved { path: path.to_string(), section, valid }
    }
}
