//! Restart-on-change debounce with a generation counter.
//!
//! Every [`Debouncer::restart`] bumps the generation. A timer or a network
//! response carrying an older ticket is stale and must be dropped.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
	generation: u64,
}

#[derive(Debug, Default)]
pub struct Debouncer<K> {
	generation: u64,
	key: Option<K>,
}

impl<K: PartialEq + Clone> Debouncer<K> {
	pub fn new() -> Self {
		Self {
			generation: 0,
			key: None,
		}
	}

	/// Start a new window for `key`, invalidating all earlier tickets.
	pub fn restart(&mut self, key: Option<K>) -> Ticket {
		self.generation += 1;
		self.key = key;
		Ticket {
			generation: self.generation,
		}
	}

	/// Invalidate outstanding tickets without starting a new window.
	pub fn cancel(&mut self) {
		self.restart(None);
	}

	pub fn is_current(&self, ticket: Ticket) -> bool {
		ticket.generation == self.generation
	}

	/// The key to search for when `ticket`'s timer fires, if still current.
	pub fn fire(&self, ticket: Ticket) -> Option<K> {
		self.is_current(ticket).then(|| self.key.clone()).flatten()
	}

	/// Whether a response for `key` fetched under `ticket` may be applied.
	pub fn accepts(&self, ticket: Ticket, key: &K) -> bool {
		self.is_current(ticket) && self.key.as_ref() == Some(key)
	}
}
