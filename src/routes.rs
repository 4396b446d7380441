//! Static route table. Paths resolve to pages; unknown paths land on NotFound.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Page {
    Today,
    Notes,
    NotFound,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Route {
    pub id: &'static str,
    pub label: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
    pub page: Page,
}

pub const HOME_PATH: &str = "/today";

pub const ROUTES: &[Route] = &[
    Route {
        id: "today",
        label: "Today",
        path: "/today",
        icon: "Calendar",
        page: Page::Today,
    },
    Route {
        id: "notes",
        label: "Notes",
        path: "/notes",
        icon: "FileText",
        page: Page::Notes,
    },
];

pub fn resolve(path: &str) -> Page {
    find(path).map(|route| route.page).unwrap_or(Page::NotFound)
}

pub fn find(path: &str) -> Option<&'static Route> {
    let normalized = normalize(path);
    ROUTES.iter().find(|route| route.path == normalized)
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim();
    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.is_empty() {
        return HOME_PATH.to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
