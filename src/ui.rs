// UI layer: an interactive terminal menu built on `dialoguer`.
// Each menu entry is turned into a `Command` for the controller and the
// returned state is rendered; nothing here talks to the network directly.

use crate::api::{ApiClient, AskResponse, Backend, ChunkRecord, IndexSummary};
use crate::controller::{Command, Controller, HealthStatus, View, WorkflowState};
use crate::document::UploadedDocument;
use crate::error::ClientError;
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

const TITLE: &str = "AI RAG Study Assistant";
const DESCRIPTION: &str =
    "Upload your notes as PDFs, build an index, and ask questions answered from them.";
const REBUILD_NOTE: &str = "Building clears the previous index on the server and rebuilds it \
     from the PDFs selected in this session.";
const SEPARATOR: &str = "----------------------------------------";

/// Main interactive menu. Runs until the user chooses "Exit".
pub fn main_menu(api: ApiClient) -> Result<()> {
    let mut controller = Controller::new(api);
    print_banner(controller.backend().base_url());

    loop {
        print_selection(controller.documents());
        let items = [
            "Check backend health",
            "Pick PDFs (file dialog)",
            "Add PDF by path",
            "Clear selected PDFs",
            "Build / Rebuild index",
            "Ask a question",
            "Exit",
        ];
        let selection = Select::new()
            .with_prompt("What would you like to do?")
            .items(&items)
            .default(0)
            .interact()?;
        match selection {
            0 => {
                let spinner = start_spinner("Checking backend...");
                let view = controller.dispatch(Command::CheckHealth);
                spinner.finish_and_clear();
                render(view)?;
            }
            1 => match pick_documents() {
                Some(paths) => add_paths(&mut controller, &paths),
                None => println!("No files selected."),
            },
            2 => {
                let path: String = Input::new().with_prompt("PDF file path").interact_text()?;
                add_paths(&mut controller, &[PathBuf::from(path.trim())]);
            }
            3 => {
                controller.clear_documents();
                println!("Selection cleared.");
            }
            4 => {
                println!("{}", REBUILD_NOTE.blue());
                let spinner = start_spinner("Building index from your PDFs...");
                let view = controller.dispatch(Command::BuildIndex);
                spinner.finish_and_clear();
                render(view)?;
            }
            5 => {
                let question: String = Input::new()
                    .with_prompt("Your question")
                    .allow_empty(true)
                    .interact_text()?;
                let spinner = start_spinner("Thinking...");
                let view = controller.dispatch(Command::Ask(question));
                spinner.finish_and_clear();
                render(view)?;
            }
            6 => break,
            _ => {}
        }
    }
    Ok(())
}

fn print_banner(backend: &str) {
    println!("{}", TITLE.bold());
    println!("{}", DESCRIPTION);
    println!("Current backend: {}", backend.cyan());
    println!();
}

fn print_selection(documents: &[UploadedDocument]) {
    if documents.is_empty() {
        println!("Selected PDFs: none");
        return;
    }
    println!("Selected PDFs ({}):", documents.len());
    for doc in documents {
        println!("  - {} ({} bytes)", doc.filename(), doc.len());
    }
}

fn start_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Native file picker limited to PDFs, opened in the home directory.
fn pick_documents() -> Option<Vec<PathBuf>> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Select PDF notes")
        .add_filter("PDF", &["pdf"]);
    if let Some(home) = dirs::home_dir() {
        dialog = dialog.set_directory(home);
    }
    dialog.pick_files()
}

fn add_paths<B: Backend>(controller: &mut Controller<B>, paths: &[PathBuf]) {
    for path in paths {
        match UploadedDocument::from_path(path) {
            Ok(doc) => {
                println!("Added {}", doc.filename());
                controller.add_document(doc);
            }
            Err(e) => println!("{}", format!("Skipped: {:#}", e).yellow()),
        }
    }
}

fn render(view: View<'_>) -> Result<()> {
    match view {
        View::Health(state) => render_state(state, render_health),
        View::Build(state) => render_state(state, render_build),
        View::Ask(state) => match state {
            WorkflowState::Success(resp) => render_answer(resp)?,
            other => render_state(other, |_| {}),
        },
    }
    Ok(())
}

fn render_state<T>(state: &WorkflowState<T>, on_success: impl FnOnce(&T)) {
    match state {
        WorkflowState::Idle => {}
        WorkflowState::Pending => println!("{}", "Still waiting on the previous request.".yellow()),
        WorkflowState::Success(value) => on_success(value),
        WorkflowState::Failure(err) => render_fault(err),
    }
}

fn render_fault(err: &ClientError) {
    if err.is_validation() {
        println!("{}", err.to_string().yellow());
    } else {
        println!("{}", err.to_string().red());
    }
}

fn render_health(status: &HealthStatus) {
    match status {
        HealthStatus::Healthy => println!("{}", "Backend is healthy".green()),
        HealthStatus::Unreachable => println!("{}", "Backend is not reachable".red()),
    }
}

fn render_build(summary: &IndexSummary) {
    println!("{}", "Index built successfully".green());
    println!("Total chunks indexed: {}", summary.chunks);
}

fn render_answer(resp: &AskResponse) -> Result<()> {
    println!("{}", "Answer".bold().green());
    println!("{}", answer_text(resp));
    println!();

    let show_context = Confirm::new()
        .with_prompt("Show retrieved context?")
        .default(false)
        .interact()?;
    if show_context {
        println!("{}", format_literal_block(&resp.context));
    }

    if !resp.chunks.is_empty() {
        let show_chunks = Confirm::new()
            .with_prompt(format!("Show retrieved chunks ({})?", resp.chunks.len()))
            .default(false)
            .interact()?;
        if show_chunks {
            print!("{}", format_chunks(&resp.chunks));
        }
    }
    Ok(())
}

fn answer_text(resp: &AskResponse) -> &str {
    if resp.answer.is_empty() {
        "No answer returned."
    } else {
        &resp.answer
    }
}

/// Render text verbatim inside a gutter so it reads as a block.
pub fn format_literal_block(text: &str) -> String {
    let mut out = String::from("┌──\n");
    for line in text.lines() {
        out.push_str("│ ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("└──");
    out
}

/// Enumerate chunks from 1 in the order the backend ranked them.
pub fn format_chunks(chunks: &[ChunkRecord]) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        out.push_str(&format!("Chunk {}\n", i + 1));
        out.push_str(&format!(
            "Source: {} - chunk index: {}\n",
            chunk.metadata.source_file, chunk.metadata.chunk_index
        ));
        out.push_str(&chunk.text);
        out.push('\n');
        out.push_str(SEPARATOR);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChunkMetadata;

    fn chunk(text: &str, source: &str, index: i64) -> ChunkRecord {
        ChunkRecord {
            text: text.into(),
            metadata: ChunkMetadata {
                source_file: source.into(),
                chunk_index: index,
            },
        }
    }

    #[test]
    fn chunks_are_numbered_from_one_in_order() {
        let out = format_chunks(&[chunk("second best", "b.pdf", 7), chunk("t", "a.pdf", 3)]);
        let expected = format!(
            "Chunk 1\nSource: b.pdf - chunk index: 7\nsecond best\n{sep}\n\
             Chunk 2\nSource: a.pdf - chunk index: 3\nt\n{sep}\n",
            sep = SEPARATOR
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn missing_metadata_renders_placeholders() {
        let out = format_chunks(&[ChunkRecord::default()]);
        assert!(out.contains("Source: unknown - chunk index: -1"));
    }

    #[test]
    fn no_chunks_renders_nothing() {
        assert_eq!(format_chunks(&[]), "");
    }

    #[test]
    fn literal_block_keeps_lines() {
        assert_eq!(
            format_literal_block("# heading\n  indented"),
            "┌──\n│ # heading\n│   indented\n└──"
        );
    }

    #[test]
    fn empty_answer_uses_placeholder() {
        assert_eq!(answer_text(&AskResponse::default()), "No answer returned.");
        let resp = AskResponse {
            answer: "TCP is connection oriented.".into(),
            ..Default::default()
        };
        assert_eq!(answer_text(&resp), "TCP is connection oriented.");
    }
}
