//! Domain values: shots, difficulty levels and solution links.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{WtmError, WtmResult};

/// Tags that make a shot unsuitable for a general audience.
pub const DEFAULT_EXCLUDED_TAGS: [&str; 4] = ["nude", "nudity", "boob", "boobs"];

/// A screenshot served by `/shot/random`, with its movie title when known.
///
/// The image payload is never empty. `movie_name` is only set when the
/// solution request returned a decodable title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shot {
    #[serde(skip)]
    image_data: Vec<u8>,
    image_url: String,
    movie_name: Option<String>,
}

impl Shot {
    /// Build a shot, rejecting an empty image payload.
    pub fn new(
        image_data: Vec<u8>,
        image_url: impl Into<String>,
        movie_name: Option<String>,
    ) -> WtmResult<Self> {
        let image_url = image_url.into();
        if image_data.is_empty() {
            return Err(WtmError::EmptyImage(image_url));
        }
        Ok(Self {
            image_data,
            image_url,
            movie_name,
        })
    }

    /// Raw image bytes as served by the site.
    pub fn image_data(&self) -> &[u8] {
        &self.image_data
    }

    /// Absolute URL the image was downloaded from.
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Solved movie title, if the community already found it.
    pub fn movie_name(&self) -> Option<&str> {
        self.movie_name.as_deref()
    }

    pub fn is_solved(&self) -> bool {
        self.movie_name.is_some()
    }

    /// Last path segment of the image URL, e.g. `12345.jpg`.
    pub fn file_name(&self) -> &str {
        let path = self
            .image_url
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.image_url);
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Take ownership of the image bytes.
    pub fn into_image_data(self) -> Vec<u8> {
        self.image_data
    }
}

/// Server-side shot selection level, set through `/shot/setrandomoptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    All,
}

impl Difficulty {
    /// Form value expected by the site.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::All => "all",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = WtmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "all" => Ok(Difficulty::All),
            other => Err(WtmError::InvalidDifficulty(other.to_string())),
        }
    }
}

/// Where the "show solution" button of a shot page points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionLink {
    /// No button: nobody solved this shot yet.
    NotSolved,
    /// Relative or absolute href of the solution endpoint.
    Link(String),
}

impl SolutionLink {
    pub fn from_href(href: Option<String>) -> Self {
        match href {
            Some(href) if !href.is_empty() => SolutionLink::Link(href),
            _ => SolutionLink::NotSolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shot_rejects_empty_image() {
        let err = Shot::new(Vec::new(), "https://img.example/1.jpg", None).unwrap_err();
        assert!(matches!(err, WtmError::EmptyImage(url) if url == "https://img.example/1.jpg"));
    }

    #[test]
    fn test_shot_accessors() {
        let shot = Shot::new(
            vec![0xff, 0xd8],
            "https://static.whatthemovie.com/images/shots/12345.jpg?1",
            Some("Alien".to_string()),
        )
        .unwrap();
        assert_eq!(shot.image_data(), &[0xff, 0xd8]);
        assert_eq!(shot.movie_name(), Some("Alien"));
        assert!(shot.is_solved());
        assert_eq!(shot.file_name(), "12345.jpg");
    }

    #[test]
    fn test_shot_serializes_without_bytes() {
        let shot = Shot::new(vec![1, 2, 3], "https://x/1.jpg", None).unwrap();
        let json = serde_json::to_value(&shot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "image_url": "https://x/1.jpg", "movie_name": null })
        );
    }

    #[test]
    fn test_difficulty_parse_and_display() {
        for d in [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::All,
        ] {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), d);
        }
        assert_eq!(" HARD ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!(matches!(
            "insane".parse::<Difficulty>(),
            Err(WtmError::InvalidDifficulty(v)) if v == "insane"
        ));
        assert_eq!(Difficulty::Medium.to_string(), "medium");
    }

    #[test]
    fn test_solution_link_from_href() {
        assert_eq!(SolutionLink::from_href(None), SolutionLink::NotSolved);
        assert_eq!(
            SolutionLink::from_href(Some(String::new())),
            SolutionLink::NotSolved
        );
        assert_eq!(
            SolutionLink::from_href(Some(" ".into())),
            SolutionLink::Link(" ".into())
        );
        assert_eq!(
            SolutionLink::from_href(Some("/shot/12/showsolution".into())),
            SolutionLink::Link("/shot/12/showsolution".into())
        );
    }
}
