//! Key layout of the store.
//!
//! | Key                                 | Value                          |
//! |-------------------------------------|--------------------------------|
//! | `works/by-id/{id}`                  | `Work` (authoritative)         |
//! | `works/by-artist/{artistId}`        | map `id -> Work`               |
//! | `works/by-year-week/{year}/{week}`  | map `id -> Work`               |
//! | `works/all`                         | list of `Work`, unique by id   |
//! | `artists/all`                       | map `discordId -> Artist`      |
//! | `artists/by-name/{lowercase name}`  | `discordId`                    |
//! | `weeks`                             | list of `Week`                 |

pub const WORKS_BY_ID_PREFIX: &str = "works/by-id/";
pub const WORKS_BY_ARTIST_PREFIX: &str = "works/by-artist/";
pub const WORKS_BY_YEAR_WEEK_PREFIX: &str = "works/by-year-week/";
pub const WORKS_ALL: &str = "works/all";
pub const ARTISTS_ALL: &str = "artists/all";
pub const ARTISTS_BY_NAME_PREFIX: &str = "artists/by-name/";
pub const WEEKS: &str = "weeks";

pub fn work_by_id(id: &str) -> String {
    format!("{WORKS_BY_ID_PREFIX}{id}")
}

pub fn works_by_artist(artist_id: &str) -> String {
    format!("{WORKS_BY_ARTIST_PREFIX}{artist_id}")
}

pub fn works_by_year_week(year: i32, week: u32) -> String {
    format!("{WORKS_BY_YEAR_WEEK_PREFIX}{year}/{week}")
}

/// Name index keys are case-insensitive and trimmed.
pub fn artist_by_name(name: &str) -> String {
    format!("{ARTISTS_BY_NAME_PREFIX}{}", normalize_name(name))
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_keys() {
        assert_eq!(work_by_id("abcd1234"), "works/by-id/abcd1234");
        assert_eq!(works_by_artist("42"), "works/by-artist/42");
        assert_eq!(works_by_year_week(2024, 3), "works/by-year-week/2024/3");
    }

    #[test]
    fn name_key_ignores_case_and_padding() {
        assert_eq!(artist_by_name("  Moon Cat "), "artists/by-name/moon cat");
        assert_eq!(artist_by_name("MOON CAT"), artist_by_name("moon cat"));
    }
}
