//! Lightweight work-context memory for AI agents.
//!
//! ContextBuddy keeps notes, decisions, and action items about the teams and projects a
//! user works on, plus a small planning layer (periods, tickets, milestones). Everything
//! lives in plain JSON files inside one data folder, so the agent, the dashboard, and a
//! text editor can all look at the same state.
//!
//! | Note type | Typical trigger | Status |
//! |-----------|-----------------|--------|
//! | **decision** | "we decided to...", "let's go with...", "decision:" | none |
//! | **action** | "need to...", "TODO", "action:" | open / done / cancelled |
//! | **note** | "remember that...", "keep in mind..." | none |
//! | **idea** | "what if...", "maybe we..." | none |
//! | **question** | "not sure...", a trailing `?` | none |
//!
//! # Surfaces
//!
//! - **MCP tools** over stdio (`contextbuddy serve`), for the agent
//! - **Dashboard** over HTTP with a live SSE refresh channel (`contextbuddy web`)
//! - **Capture hook** that tags capture-worthy prompts (`contextbuddy hook`)
//! - **Desktop shell** that supervises the dashboard and registers the agent
//!   (`contextbuddy shell`)
//!
//! # Modules
//!
//! - [`config`]: configuration loading from TOML files and environment variables
//! - [`storage`]: the flat-file JSON store and its typed repositories
//! - [`classify`]: rule-based capture filter and context suggestion
//! - [`tools`]: the `cb_*` MCP tool surface
//! - [`server`]: stdio MCP entry point
//! - [`web`]: dashboard HTTP API, static files, and push channel
//! - [`desktop`]: background server supervision, shell settings, agent registration

pub mod classify;
pub mod config;
pub mod desktop;
pub mod server;
pub mod storage;
pub mod tools;
pub mod web;
