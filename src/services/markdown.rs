use crate::services::slug::derive_slug;
use ammonia::Builder;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Renders recipe instructions written in Markdown to sanitised HTML.
pub struct MarkdownRenderer {
    sanitizer: Builder<'static>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut tags = ammonia::Builder::default().clone_tags();
        tags.insert("table");
        tags.insert("thead");
        tags.insert("tbody");
        tags.insert("tr");
        tags.insert("th");
        tags.insert("td");
        tags.insert("del");
        tags.insert("input");

        let mut attrs = ammonia::Builder::default().clone_tag_attributes();
        attrs.insert(
            "input",
            ["type", "checked", "disabled"].iter().cloned().collect(),
        );
        // Step headings are linkable
        for heading in ["h1", "h2", "h3", "h4", "h5", "h6"] {
            attrs.insert(heading, ["id"].iter().cloned().collect());
        }
        attrs.insert(
            "img",
            ["src", "alt", "title", "width", "height", "loading"]
                .iter()
                .cloned()
                .collect(),
        );

        let mut sanitizer = Builder::default();
        sanitizer
            .tags(tags)
            .tag_attributes(attrs)
            .link_rel(Some("noopener noreferrer"));

        Self { sanitizer }
    }

    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;

        let parser = Parser::new_ext(markdown, options);
        let mut events: Vec<Event> = Vec::new();
        let mut open_heading: Option<usize> = None;
        let mut heading_text = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    id: None,
                    classes,
                    attrs,
                }) => {
                    open_heading = Some(events.len());
                    heading_text.clear();
                    events.push(Event::Start(Tag::Heading {
                        level,
                        id: None,
                        classes,
                        attrs,
                    }));
                }
                Event::Text(ref text) | Event::Code(ref text) if open_heading.is_some() => {
                    heading_text.push_str(text);
                    events.push(event.clone());
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(start) = open_heading.take() {
                        let anchor = derive_slug(&heading_text);
                        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                            if !anchor.is_empty() {
                                *id = Some(CowStr::from(anchor));
                            }
                        }
                    }
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        self.sanitizer.clean(&html_output).to_string()
    }
}
