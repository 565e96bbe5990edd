use crate::api::DirectoryItem;
use crate::components::{row_dom_id, Icon};
use dioxus::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct FileRow {
    pub item: DirectoryItem,
    pub is_playing: bool,
    pub has_been_played: bool,
}

impl FileRow {
    fn row_class(&self) -> &'static str {
        if self.is_playing {
            "file-row is-playing"
        } else if self.has_been_played {
            "file-row is-played"
        } else {
            "file-row"
        }
    }
}

#[component]
pub fn FileList(rows: Vec<FileRow>, on_select: EventHandler<DirectoryItem>) -> Element {
    rsx! {
        table { class: "file-list",
            tbody {
                for (index, row) in rows.into_iter().enumerate() {
                    FileListRow {
                        key: "{row.item.media_content_id}",
                        index,
                        row: row.clone(),
                        on_select,
                    }
                }
            }
        }
    }
}

#[component]
fn FileListRow(index: usize, row: FileRow, on_select: EventHandler<DirectoryItem>) -> Element {
    let icon = if row.item.is_directory() { "folder" } else { "file" };
    let class = row.row_class();
    let title = row.item.title.clone();
    let content_id = row.item.media_content_id.clone();
    let item = row.item;

    rsx! {
        tr {
            id: row_dom_id(index),
            class,
            "data-content-id": content_id,
            onclick: move |_| on_select.call(item.clone()),
            td { class: "file-icon",
                Icon { name: icon.to_string(), class: "icon".to_string() }
            }
            td { class: "file-title", "{title}" }
        }
    }
}
