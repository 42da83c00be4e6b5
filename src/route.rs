// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, str::FromStr};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    Home,
    Upload,
    Explore,
    EditVideo,
    Friends,
    Posts,
    CreatePost,
    Contact,
    About,
    Feedback,
    Login,
    Register,
    NotFound,
}

/// The links shown in the navigation bar, in display order.
pub(crate) const NAV_LINKS: [(Route, &str); 7] = [
    (Route::Home, "Home"),
    (Route::Upload, "Upload"),
    (Route::Explore, "Explore"),
    (Route::Posts, "Discussion"),
    (Route::Contact, "Contact"),
    (Route::About, "About"),
    (Route::Feedback, "Feedback"),
];

const ROUTES: [Route; 12] = [
    Route::Home,
    Route::Upload,
    Route::Explore,
    Route::EditVideo,
    Route::Friends,
    Route::Posts,
    Route::CreatePost,
    Route::Contact,
    Route::About,
    Route::Feedback,
    Route::Login,
    Route::Register,
];

impl Route {
    pub(crate) const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Upload => "/upload",
            Self::Explore => "/explore",
            Self::EditVideo => "/edit-video",
            Self::Friends => "/friends",
            Self::Posts => "/posts",
            Self::CreatePost => "/create-post",
            Self::Contact => "/contact",
            Self::About => "/about",
            Self::Feedback => "/feedback",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::NotFound => "/404",
        }
    }

    /// Authentication pages take the whole screen, without the navbar.
    pub(crate) const fn shows_navbar(self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }

    /// Unknown paths resolve to [`Route::NotFound`]. Query strings, fragments and
    /// a trailing slash are ignored.
    pub(crate) fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };

        ROUTES
            .into_iter()
            .find(|route| route.path() == path)
            .unwrap_or(Self::NotFound)
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_path(s))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_paths() {
        for route in ROUTES {
            assert_eq!(Route::from_path(route.path()), route);
        }
        assert_eq!(Route::from_path("/posts/"), Route::Posts);
        assert_eq!(Route::from_path("/explore?tag=music#top"), Route::Explore);
        assert_eq!(Route::from_path(""), Route::Home);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(Route::from_path("/nowhere"), Route::NotFound);
        assert_eq!(Route::from_path("/404"), Route::NotFound);
    }

    #[test]
    fn auth_pages_hide_navbar() {
        assert!(!Route::Login.shows_navbar());
        assert!(!Route::Register.shows_navbar());
        assert!(Route::Home.shows_navbar());
        assert!(Route::NotFound.shows_navbar());
    }
}
