//! # Route table
//!
//! Maps URL paths to [`Page`]s and pages to what is actually rendered for a
//! given [`LayoutVariant`].
//!
//! | Path | Page | Desktop | Mobile |
//! |------|------|---------|--------|
//! | `/login` | [`Page::Login`] | login screen | login screen |
//! | `/signup` | [`Page::SignUp`] | sign-up screen | sign-up screen |
//! | `/` | [`Page::Lists`] | three panes | list board |
//! | `/account` | [`Page::Account`] | three panes | account panel |
//! | `/tasks` | [`Page::Tasks`] without a list | three panes | task board, empty state |
//! | `/tasks/:list_name` | [`Page::Tasks`] | three panes, list selected | task board |
//! | anything else | [`Page::NotFound`] | not-found screen | not-found screen |
//!
//! List names are percent-encoded in paths.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::layout::LayoutVariant;

/// Characters escaped in a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Page {
    Login,
    SignUp,
    Lists,
    Account,
    Tasks { list_name: Option<String> },
    NotFound,
}

impl Page {
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Page::Lists,
            ["login"] => Page::Login,
            ["signup"] => Page::SignUp,
            ["account"] => Page::Account,
            ["tasks"] => Page::Tasks { list_name: None },
            ["tasks", name] => {
                let decoded = percent_decode_str(name).decode_utf8_lossy();
                Page::Tasks {
                    list_name: Some(decoded.into_owned()).filter(|n| !n.is_empty()),
                }
            }
            _ => Page::NotFound,
        }
    }

    pub fn href(&self) -> String {
        match self {
            Page::Login => "/login".to_string(),
            Page::SignUp => "/signup".to_string(),
            Page::Lists | Page::NotFound => "/".to_string(),
            Page::Account => "/account".to_string(),
            Page::Tasks { list_name: None } => "/tasks".to_string(),
            Page::Tasks {
                list_name: Some(name),
            } => format!("/tasks/{}", utf8_percent_encode(name, SEGMENT)),
        }
    }

    /// Short human name of the screen, as used in link labels.
    pub fn title(&self) -> String {
        match self {
            Page::Login => "Sign in".to_string(),
            Page::SignUp => "Sign up".to_string(),
            Page::Lists | Page::NotFound => "Lists".to_string(),
            Page::Account => "Account".to_string(),
            Page::Tasks { list_name: None } => "Tasks".to_string(),
            Page::Tasks {
                list_name: Some(name),
            } => name.clone(),
        }
    }

    /// Link target for a list's task board.
    pub fn tasks_of(list_name: &str) -> Self {
        Page::Tasks {
            list_name: Some(list_name.to_string()),
        }
    }
}

/// A single full-screen view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    SignUp,
    Lists,
    Account,
    Tasks { list_name: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Composition {
    Single(Screen),
    /// Lists, tasks and account side by side.
    ThreePane { list_name: Option<String> },
    NotFound,
}

pub fn compose(page: &Page, variant: LayoutVariant) -> Composition {
    match (page, variant) {
        (Page::Login, _) => Composition::Single(Screen::Login),
        (Page::SignUp, _) => Composition::Single(Screen::SignUp),
        (Page::NotFound, _) => Composition::NotFound,
        (Page::Lists | Page::Account, LayoutVariant::Desktop) => {
            Composition::ThreePane { list_name: None }
        }
        (Page::Tasks { list_name }, LayoutVariant::Desktop) => Composition::ThreePane {
            list_name: list_name.clone(),
        },
        (Page::Lists, LayoutVariant::Mobile) => Composition::Single(Screen::Lists),
        (Page::Account, LayoutVariant::Mobile) => Composition::Single(Screen::Account),
        (Page::Tasks { list_name }, LayoutVariant::Mobile) => Composition::Single(Screen::Tasks {
            list_name: list_name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_covers_every_route() {
        assert_eq!(Page::from_path("/"), Page::Lists);
        assert_eq!(Page::from_path("/login"), Page::Login);
        assert_eq!(Page::from_path("/signup/"), Page::SignUp);
        assert_eq!(Page::from_path("/account?tab=avatar"), Page::Account);
        assert_eq!(Page::from_path("/tasks"), Page::Tasks { list_name: None });
        assert_eq!(Page::from_path("/tasks/Groceries"), Page::tasks_of("Groceries"));
        assert_eq!(Page::from_path("/nope"), Page::NotFound);
        assert_eq!(Page::from_path("/tasks/a/b"), Page::NotFound);
    }

    #[test]
    fn test_list_names_are_percent_encoded() {
        let page = Page::tasks_of("Home & Garden / 2024");

        let href = page.href();

        assert_eq!(href, "/tasks/Home%20&%20Garden%20%2F%202024");
        assert_eq!(Page::from_path(&href), page);
    }

    #[test]
    fn test_desktop_composes_three_panes() {
        let desktop = LayoutVariant::Desktop;

        assert_eq!(
            compose(&Page::Lists, desktop),
            Composition::ThreePane { list_name: None }
        );
        assert_eq!(
            compose(&Page::Account, desktop),
            Composition::ThreePane { list_name: None }
        );
        assert_eq!(
            compose(&Page::tasks_of("Groceries"), desktop),
            Composition::ThreePane {
                list_name: Some("Groceries".to_string())
            }
        );
        assert_eq!(
            compose(&Page::Login, desktop),
            Composition::Single(Screen::Login)
        );
        assert_eq!(compose(&Page::NotFound, desktop), Composition::NotFound);
    }

    #[test]
    fn test_mobile_composes_single_screens() {
        let mobile = LayoutVariant::Mobile;

        assert_eq!(compose(&Page::Lists, mobile), Composition::Single(Screen::Lists));
        assert_eq!(
            compose(&Page::Account, mobile),
            Composition::Single(Screen::Account)
        );
        assert_eq!(
            compose(&Page::Tasks { list_name: None }, mobile),
            Composition::Single(Screen::Tasks { list_name: None })
        );
        assert_eq!(
            compose(&Page::SignUp, mobile),
            Composition::Single(Screen::SignUp)
        );
    }
}
