//! Shared helpers for engine tests.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use trawl_core::MatchResult;
use trawl_syntax::{Node, ParseResult, Parser, SupportedLanguage};

use crate::{FsTreeProvider, MatchResultSink, MatchingProcess, ProgressIndicator, WalkdirIndex, Workspace};

pub(super) fn parse(language: SupportedLanguage, source: &str) -> ParseResult {
    Parser::new(language)
        .expect("parser")
        .parse(source)
        .expect("parse")
}

/// A workspace whose index and provider are never consulted.
pub(super) fn memory_workspace() -> Workspace {
    Workspace::new(WalkdirIndex::new("."), FsTreeProvider)
}

pub(super) fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (name, contents) in files {
        fs::write(root.join(name), contents).expect("write fixture");
    }
}

/// Every node below `node`, in pre-order, `node` included.
pub(super) fn all_nodes(node: Node<'_>) -> Vec<Node<'_>> {
    let mut nodes = vec![node];
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    for child in children {
        nodes.extend(all_nodes(child));
    }
    nodes
}

pub(super) fn find_node<'t>(tree: &'t ParseResult, kind: &str, text: &str) -> Node<'t> {
    all_nodes(tree.root_node())
        .into_iter()
        .find(|node| node.kind() == kind && tree.text(*node) == text)
        .unwrap_or_else(|| panic!("no {kind} node with text {text:?}"))
}

pub(super) fn binding_texts(results: &[MatchResult], name: &str) -> Vec<String> {
    results
        .iter()
        .map(|result| {
            result
                .binding(name)
                .map(|binding| binding.text().to_owned())
                .unwrap_or_default()
        })
        .collect()
}

pub(super) fn file_names(paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Vec<String> {
    paths
        .into_iter()
        .map(|path| {
            path.as_ref()
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect()
}

/// Sink that pauses the search after its first match.
#[derive(Default)]
pub(super) struct PausingSink {
    pub(super) process: Option<MatchingProcess>,
    pub(super) matches: Vec<MatchResult>,
    pub(super) finished: usize,
}

impl MatchResultSink for PausingSink {
    fn new_match(&mut self, result: MatchResult) {
        self.matches.push(result);
        if self.matches.len() == 1 {
            if let Some(process) = &self.process {
                process.pause();
            }
        }
    }

    fn matching_finished(&mut self) {
        self.finished += 1;
    }

    fn set_matching_process(&mut self, process: MatchingProcess) {
        self.process = Some(process);
    }
}

/// Progress indicator that records every update.
#[derive(Default)]
pub(super) struct RecordingProgress {
    pub(super) updates: Mutex<Vec<(usize, usize)>>,
}

impl ProgressIndicator for RecordingProgress {
    fn set_progress(&self, scanned: usize, total: usize) {
        self.updates
            .lock()
            .expect("progress lock")
            .push((scanned, total));
    }

    fn set_text(&self, _text: &str) {}
}

/// Sink that reports progress through a shared indicator.
pub(super) struct ProgressSink {
    pub(super) progress: Arc<RecordingProgress>,
}

impl MatchResultSink for ProgressSink {
    fn new_match(&mut self, _result: MatchResult) {}

    fn progress_indicator(&self) -> Option<Arc<dyn ProgressIndicator>> {
        Some(Arc::clone(&self.progress) as Arc<dyn ProgressIndicator>)
    }
}
