//! Plain-text rendering of a single item for the clipboard

use crate::models::Item;

/// Format an item as shareable text
///
/// The title comes first, followed by description, caution, link and
/// hashtags. Empty sections are left out; sections are separated by a blank
/// line.
pub fn format_for_clipboard(item: &Item) -> String {
    let mut sections = vec![item.title.trim().to_string()];

    let content = item.content.trim();
    if !content.is_empty() {
        sections.push(format!("Description:\n{}", content));
    }

    let caution = item.caution.trim();
    if !caution.is_empty() {
        sections.push(format!("Caution:\n{}", caution));
    }

    let link = item.link.trim();
    if !link.is_empty() {
        sections.push(format!("Link: {}", link));
    }

    if !item.tags.is_empty() {
        sections.push(item.hashtags());
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item {
            id: "a".to_string(),
            title: "Shoulder Stretch".to_string(),
            content: String::new(),
            caution: String::new(),
            link: String::new(),
            tags: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_title_only() {
        assert_eq!(format_for_clipboard(&item()), "Shoulder Stretch");
    }

    #[test]
    fn test_all_sections() {
        let mut item = item();
        item.content = "Pull the arm across the chest.".to_string();
        item.caution = "Avoid with a recent injury.".to_string();
        item.link = "https://example.com/shoulder".to_string();
        item.tags = vec!["shoulder".to_string(), "mobility".to_string()];

        assert_eq!(
            format_for_clipboard(&item),
            "Shoulder Stretch\n\n\
             Description:\nPull the arm across the chest.\n\n\
             Caution:\nAvoid with a recent injury.\n\n\
             Link: https://example.com/shoulder\n\n\
             #shoulder #mobility"
        );
    }

    #[test]
    fn test_blank_sections_are_omitted() {
        let mut item = item();
        item.caution = "   ".to_string();
        item.tags = vec!["arms".to_string()];

        assert_eq!(format_for_clipboard(&item), "Shoulder Stretch\n\n#arms");
    }
}
