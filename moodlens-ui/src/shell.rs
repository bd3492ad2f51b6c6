//! Line-oriented interactive session
//!
//! Plain lines are typed into the song search; lines starting with `:` are
//! commands. An empty line clears the query (and with it the selection).

use anyhow::Result;
use moodlens_common::events::UiEvent;
use moodlens_ui::backend::HttpBackend;
use moodlens_ui::image_picker::ImageCandidate;
use moodlens_ui::search::{PanelSnapshot, SearchStatus};
use moodlens_ui::viewer::ImageSlot;
use moodlens_ui::AppState;
use std::fmt::Write as _;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Type to search for a song. Commands:
  :pick N                 select search result N
  :clear-song             clear the selected song
  :focus | :blur          open / close the result list
  :image PATH             choose an image (JPEG, PNG, WebP, max 10MB)
  :clear-image            remove the chosen image
  :go                     generate the stylized image
  :view original|stylized show an image full size
  :close                  close the full-size view
  :save DIR               download both result images
  :reset                  start over
  :status                 show current selections
  :quit";

/// Result list (or its placeholder) as text
pub fn render_panel(snapshot: &PanelSnapshot, min_query_len: usize) -> String {
    let mut out = String::new();

    match snapshot.status {
        SearchStatus::Empty => {}
        SearchStatus::TooShort => {
            let _ = writeln!(out, "Type at least {} characters to search", min_query_len);
        }
        SearchStatus::Searching => {
            let _ = writeln!(out, "Searching...");
        }
        SearchStatus::NoResults => {
            if let Some(message) = snapshot.no_results_message() {
                let _ = writeln!(out, "{}", message);
            }
        }
        SearchStatus::Results | SearchStatus::Selected => {
            for (i, song) in snapshot.visible_results().iter().enumerate() {
                let _ = writeln!(out, "{:>3}. {}", i + 1, song.name);
                let _ = writeln!(out, "     {}", song.subtitle());
            }
        }
    }

    if let Some(song) = &snapshot.selected {
        let _ = writeln!(out, "Selected: {} ({})", song.label(), song.album);
    }

    out
}

async fn render_status(state: &AppState) -> String {
    let mut out = String::new();

    match state.image_picker.selected() {
        Some(image) => {
            let _ = writeln!(out, "Image: {} ({})", image.file_name(), image.size_label());
        }
        None => {
            let _ = writeln!(out, "Image: none");
        }
    }
    match state.song_panel.selected().await {
        Some(song) => {
            let _ = writeln!(out, "Song:  {}", song.label());
        }
        None => {
            let _ = writeln!(out, "Song:  none");
        }
    }

    let submit = if state.can_submit().await {
        "ready"
    } else {
        "disabled"
    };
    let _ = writeln!(out, "[{}] {}", state.submit_label(), submit);

    if let Some(message) = state.error() {
        let _ = writeln!(out, "Error: {}", message);
    }

    out
}

pub async fn run(state: &mut AppState, backend: &HttpBackend) -> Result<()> {
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        let (command, arg) = match line.strip_prefix(':') {
            Some(rest) => {
                let mut parts = rest.splitn(2, ' ');
                let command = parts.next().unwrap_or_default();
                (Some(command), parts.next().map(str::trim).unwrap_or_default())
            }
            None => (None, ""),
        };
        debug!(?command, "Shell input");

        match command {
            None => {
                let snapshot = state.song_panel.input_and_settle(line).await;
                print!("{}", render_panel(&snapshot, state.config.min_query_len));
            }
            Some("quit") | Some("q") => break,
            Some("help") => println!("{}", HELP),
            Some("pick") => match arg.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(index) => match state.song_panel.select_index(index).await {
                    Some(song) => println!("Selected: {}", song.label()),
                    None => println!("No result {}", arg),
                },
                None => println!("Usage: :pick N"),
            },
            Some("clear-song") => {
                state.song_panel.clear_selection().await;
                println!("Song cleared");
            }
            Some("focus") => {
                state.song_panel.focus().await;
                let snapshot = state.song_panel.snapshot().await;
                print!("{}", render_panel(&snapshot, state.config.min_query_len));
            }
            Some("blur") => state.song_panel.click_outside().await,
            Some("image") => choose_image(state, Path::new(arg)).await,
            Some("clear-image") => {
                state.image_picker.clear();
                println!("Image removed");
            }
            Some("go") => submit(state).await,
            Some("view") => view(state, arg),
            Some("close") => {
                if let Some(viewer) = state.viewer.as_mut() {
                    viewer.close_overlay();
                }
            }
            Some("save") => save(state, backend, Path::new(arg)).await,
            Some("reset") => {
                state.reset().await;
                println!("Cleared");
            }
            Some("status") => print!("{}", render_status(state).await),
            Some(other) => println!("Unknown command :{} (try :help)", other),
        }
    }

    Ok(())
}

async fn choose_image(state: &mut AppState, path: &Path) {
    if path.as_os_str().is_empty() {
        println!("Usage: :image PATH");
        return;
    }

    match ImageCandidate::from_path(path).await {
        Ok(candidate) => {
            if state.image_picker.select(candidate) {
                if let Some(image) = state.image_picker.selected() {
                    println!("Image: {} ({})", image.file_name(), image.size_label());
                }
            } else if let Some(notice) = state.image_picker.notice() {
                println!("{}", notice);
            }
        }
        Err(e) => println!("Cannot read {}: {}", path.display(), e),
    }
}

async fn submit(state: &mut AppState) {
    let mut rx = state.events.subscribe();
    let progress = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            if let UiEvent::PhaseChanged { phase, .. } = event {
                if !phase.is_idle() {
                    println!("{}", phase.label());
                }
            }
        }
    });

    let outcome = state.generate().await;
    progress.abort();

    match (outcome, state.viewer.as_ref()) {
        (Ok(()), Some(viewer)) => print!("{}", viewer.render()),
        (Ok(()), None) => {}
        (Err(e), _) => println!("Error: {}", e.user_message()),
    }
}

fn view(state: &mut AppState, arg: &str) {
    let slot = match arg {
        "original" => ImageSlot::Original,
        "stylized" => ImageSlot::Stylized,
        _ => {
            println!("Usage: :view original|stylized");
            return;
        }
    };

    match state.viewer.as_mut() {
        Some(viewer) => {
            viewer.open_slot(slot);
            if let Some(url) = viewer.overlay() {
                println!("[full size] {}", url);
            }
        }
        None => println!("Nothing generated yet"),
    }
}

async fn save(state: &AppState, backend: &HttpBackend, dir: &Path) {
    let Some(viewer) = state.viewer.as_ref() else {
        println!("Nothing generated yet");
        return;
    };
    if dir.as_os_str().is_empty() {
        println!("Usage: :save DIR");
        return;
    }

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        println!("Cannot create {}: {}", dir.display(), e);
        return;
    }

    for slot in [ImageSlot::Original, ImageSlot::Stylized] {
        let url = viewer.image_url(slot);
        match crate::save_image(backend, url, dir).await {
            Ok(path) => println!("Saved {}", path.display()),
            Err(e) => println!("Error: {:#}", e),
        }
    }
}
