//! Inline label editing on a node card.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelEdit {
	pub node_id: String,
	pub original: String,
	pub draft: String,
}

/// What a key press inside the editor means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditKey {
	Commit,
	Cancel,
	Type,
}

impl EditKey {
	pub fn classify(key: &str, shift: bool) -> Self {
		match key {
			"Enter" if !shift => Self::Commit,
			"Escape" => Self::Cancel,
			_ => Self::Type,
		}
	}
}

/// At most one label is being edited at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelEditor {
	current: Option<LabelEdit>,
}

impl LabelEditor {
	pub fn current(&self) -> Option<&LabelEdit> {
		self.current.as_ref()
	}

	/// Open the editor; a previous unfinished edit is discarded.
	pub fn begin(&mut self, node_id: &str, label: &str) {
		self.current = Some(LabelEdit {
			node_id: node_id.to_string(),
			original: label.to_string(),
			draft: label.to_string(),
		});
	}

	pub fn update(&mut self, text: &str) {
		if let Some(edit) = &mut self.current {
			edit.draft = text.to_string();
		}
	}

	/// Close the editor, returning `(node_id, label)` when the trimmed draft
	/// is non-empty and differs from the label the edit started from.
	pub fn commit(&mut self) -> Option<(String, String)> {
		let edit = self.current.take()?;
		let label = edit.draft.trim();
		(!label.is_empty() && label != edit.original).then(|| (edit.node_id, label.to_string()))
	}

	/// Escape: drop the draft, the card keeps its last authoritative label.
	pub fn cancel(&mut self) -> Option<LabelEdit> {
		self.current.take()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn enter_commits_trimmed_change() {
		let mut ed = LabelEditor::default();
		ed.begin("n1", "Survey");
		ed.update("  Site survey ");
		assert_eq!(EditKey::classify("Enter", false), EditKey::Commit);
		assert_eq!(ed.commit(), Some(("n1".into(), "Site survey".into())));
		assert!(ed.current().is_none());
	}

	#[test]
	fn shift_enter_is_a_newline() {
		assert_eq!(EditKey::classify("Enter", true), EditKey::Type);
	}

	#[test]
	fn unchanged_or_blank_commit_is_noop() {
		let mut ed = LabelEditor::default();
		ed.begin("n1", "Survey");
		ed.update("Survey  ");
		assert_eq!(ed.commit(), None);
		ed.begin("n1", "Survey");
		ed.update("   ");
		assert_eq!(ed.commit(), None);
	}

	#[test]
	fn escape_discards_draft() {
		let mut ed = LabelEditor::default();
		ed.begin("n1", "Survey");
		ed.update("Other");
		assert_eq!(EditKey::classify("Escape", false), EditKey::Cancel);
		let dropped = ed.cancel().unwrap();
		assert_eq!(dropped.original, "Survey");
		// a blur right after escape has nothing left to commit
		assert_eq!(ed.commit(), None);
	}
}
