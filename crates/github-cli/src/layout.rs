use docweave_core::LayoutTemplate;

/// Fetched fields rendered in the left meta block.
const DATA_FIELDS: [&str; 4] = ["user", "created_at", "updated_at", "closed_at"];
const LINK_FIELDS: [&str; 1] = ["url"];
const IMAGE_FIELDS: [&str; 1] = ["avatar"];

/// Connector option names, excluded from the catch-all meta rendering so
/// request plumbing never shows up on a rendered item.
const OPTION_FIELDS: [&str; 5] = [
    "type",
    "query",
    "max_amount",
    "max_content_lines",
    "id_prefix",
];

/// The layout installed for this connector when the host has none under
/// the configured name: id and title up top, author identity on the
/// right, fetched metadata on the left, everything else in the catch-all
/// block.
pub fn default_layout() -> LayoutTemplate {
    let mut meta_left: Vec<String> = DATA_FIELDS
        .iter()
        .map(|field| format!("<<meta(\"{field}\", prefix=\"{field}: \")>>"))
        .collect();
    meta_left.extend(LINK_FIELDS.iter().map(|field| {
        format!("<<link(\"{field}\", text=\"Link\", prefix=\"{field}: \", is_dynamic=true)>>")
    }));

    LayoutTemplate {
        grid: "complex".to_string(),
        head_left: vec!["<<meta_id()>>".to_string()],
        head: vec!["**<<meta(\"title\")>>**".to_string()],
        head_right: vec![
            "<<image(\"field:avatar\", width=\"40px\", align=\"middle\", is_external=true)>>"
                .to_string(),
            "<<meta(\"user\")>>".to_string(),
        ],
        meta_left,
        meta_right: vec![
            "<<meta(\"type_name\", prefix=\"type: \")>>".to_string(),
            format!("<<meta_all(no_links=true, exclude=[{}])>>", exclude_list()),
            "<<meta_links_all()>>".to_string(),
        ],
        footer_left: vec!["layout: <<meta(\"layout\")>>".to_string()],
        footer: Vec::new(),
        footer_right: vec!["style: <<meta(\"style\")>>".to_string()],
    }
}

fn exclude_list() -> String {
    let mut fields: Vec<&str> = vec!["layout", "style", "status", "tags"];
    fields.extend(DATA_FIELDS);
    fields.extend(LINK_FIELDS);
    fields.extend(IMAGE_FIELDS);
    fields.extend(OPTION_FIELDS);

    fields
        .iter()
        .map(|field| format!("\"{field}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_places_id_title_and_author_in_the_head_row() {
        let layout = default_layout();

        assert_eq!(layout.grid, "complex");
        assert_eq!(layout.head_left, vec!["<<meta_id()>>"]);
        assert_eq!(layout.head, vec!["**<<meta(\"title\")>>**"]);
        assert!(layout.head_right[0].contains("field:avatar"));
        assert_eq!(layout.head_right[1], "<<meta(\"user\")>>");
    }

    #[test]
    fn layout_meta_left_covers_every_fetched_data_and_link_field() {
        let layout = default_layout();

        assert_eq!(layout.meta_left.len(), DATA_FIELDS.len() + LINK_FIELDS.len());
        for field in DATA_FIELDS {
            assert!(
                layout
                    .meta_left
                    .iter()
                    .any(|entry| entry.contains(&format!("\"{field}\""))),
                "meta_left should render {field}"
            );
        }
        assert!(layout.meta_left.last().is_some_and(|entry| entry.contains("<<link")));
    }

    #[test]
    fn layout_catch_all_excludes_connector_fields_and_options() {
        let layout = default_layout();
        let catch_all = &layout.meta_right[1];

        for field in ["status", "tags", "avatar", "url"] {
            assert!(
                catch_all.contains(&format!("\"{field}\"")),
                "catch-all should exclude {field}"
            );
        }
        for option in OPTION_FIELDS {
            assert!(
                catch_all.contains(&format!("\"{option}\"")),
                "catch-all should exclude option {option}"
            );
        }
    }

    #[test]
    fn layout_footer_names_layout_and_style() {
        let layout = default_layout();

        assert_eq!(layout.footer_left, vec!["layout: <<meta(\"layout\")>>"]);
        assert!(layout.footer.is_empty());
        assert_eq!(layout.footer_right, vec!["style: <<meta(\"style\")>>"]);
    }
}
