//! Keyword matcher that maps a bundle title to its category tags.
use crate::model::Category;

/// Categories for a bundle title, in rule order, without duplicates.
///
/// A title can carry several tags (a comic bundle is also a book bundle);
/// anything nothing matches is assumed to be a video game bundle.
pub fn categorize(title: &str) -> Vec<Category> {
    let name = title.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

    let mut categories = Vec::new();
    if has(&["book bundle:", "tech book bundle:"]) {
        add(&mut categories, Category::Books);
    }
    if has(&["comic", "manga"]) {
        add(&mut categories, Category::ComicsManga);
        add(&mut categories, Category::Books);
    }
    if has(&["rpg bundle:", "vtt bundle:", "tabletop", "3d printable"]) {
        add(&mut categories, Category::RpgTabletop);
        add(&mut categories, Category::Books);
    }
    if has(&[
        "software bundle:",
        "learn to code",
        "data science",
        "level up your python",
    ]) {
        add(&mut categories, Category::Software);
    }
    if has(&["music bundle"]) {
        add(&mut categories, Category::Music);
    }
    if categories.is_empty() {
        categories.push(Category::VideoGames);
    }
    categories
}

/// Single bucket for the read-only classification listing: the first tag wins.
pub fn primary_category(title: &str) -> Category {
    categorize(title)[0]
}

fn add(categories: &mut Vec<Category>, category: Category) {
    if !categories.contains(&category) {
        categories.push(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category::*;

    #[test]
    fn book_bundle_is_books() {
        assert_eq!(categorize("Humble Book Bundle: X"), vec![Books]);
        assert_eq!(categorize("Humble Tech Book Bundle: DevOps"), vec![Books]);
    }

    #[test]
    fn rpg_bundle_is_rpg_and_books() {
        assert_eq!(categorize("Humble RPG Bundle: Y"), vec![RpgTabletop, Books]);
    }

    #[test]
    fn comics_bundle_is_comics_and_books() {
        assert_eq!(
            categorize("Humble Comics Bundle: Z"),
            vec![ComicsManga, Books]
        );
        assert_eq!(
            categorize("Humble Manga Bundle: Shonen"),
            vec![ComicsManga, Books]
        );
    }

    #[test]
    fn software_bundle_is_software() {
        assert_eq!(categorize("Humble Software Bundle: W"), vec![Software]);
        assert_eq!(
            categorize("Humble Bundle: Level Up Your Python"),
            vec![Software]
        );
    }

    #[test]
    fn unmatched_title_is_video_games() {
        assert_eq!(categorize("Humble Bundle: Generic Game"), vec![VideoGames]);
        assert_eq!(categorize("Valheim"), vec![VideoGames]);
    }

    #[test]
    fn music_bundle_is_music() {
        assert_eq!(categorize("Humble Music Bundle: Synthwave"), vec![Music]);
    }

    #[test]
    fn no_duplicate_tags_for_mixed_titles() {
        // Hits both the book-bundle rule and the comic rule; Books appears once.
        let cats = categorize("Humble Book Bundle: Comic Artists");
        assert_eq!(cats, vec![Books, ComicsManga]);
    }

    #[test]
    fn primary_category_matches_first_rule() {
        assert_eq!(primary_category("Humble Comics Bundle: Z"), ComicsManga);
        assert_eq!(primary_category("Humble Book Bundle: X"), Books);
        assert_eq!(primary_category("Some Indie Bundle"), VideoGames);
    }
}
