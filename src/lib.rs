// Library root
// -----------
// Client for a remote document question-answering service. The binary
// (`main.rs`) wires these modules into an interactive terminal session.
//
// Module responsibilities:
// - `config`: resolves the backend address once and holds request timeouts.
// - `api`: the HTTP calls (health, index build, ask) and the `Backend`
//   trait the controller depends on.
// - `error`: the user-facing error taxonomy.
// - `document`: PDFs held in memory until the next index build.
// - `controller`: per-workflow state, driven by explicit commands.
// - `ui`: terminal rendering and the menu loop.
pub mod api;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod ui;
