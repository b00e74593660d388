/// Cooldown-counter lock deciding which of two authorities may currently move a
/// shared control surface.
///
/// The "remote" side is the simulation, the "local" side is the operator at the
/// peripheral. A change on one side arms a counter that suppresses the other
/// side for the next `cooldown_load` calls, so that the echo of a write is not
/// mistaken for a fresh request from the opposite side. Values are never
/// altered, only the right to act is gated.
///
/// Counters decay once per call, so the lock duration is measured in calls and
/// depends on the cadence of the owner.
#[derive(Debug, Clone)]
pub struct Arbiter<T> {
    last_remote: T,
    last_local: T,
    remote_cooldown: u16,
    local_cooldown: u16,
}

impl<T: PartialEq + Clone> Arbiter<T> {
    /// Creates an arbiter whose previous remote and local values are both `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            last_remote: initial.clone(),
            last_local: initial,
            remote_cooldown: 0,
            local_cooldown: 0,
        }
    }

    /// Feeds the current remote and local observation of the surface.
    ///
    /// Returns `true` if the remote side changed while the local side held no
    /// lock, i.e. the remote value should now be pushed to the local side.
    /// The remote branch is evaluated before the local branch, which makes the
    /// remote side win a simultaneous first change.
    ///
    /// # Arguments
    /// * `remote` – Value currently reported by the simulation.
    /// * `local` – Value currently reported by the peripheral.
    /// * `cooldown_load` – Number of calls a freshly armed lock lasts.
    pub fn set_requested(&mut self, remote: T, local: T, cooldown_load: u16) -> bool {
        let mut grant_remote = false;

        if remote != self.last_remote && self.local_cooldown == 0 {
            self.remote_cooldown = cooldown_load;
            grant_remote = true;
        }

        if local != self.last_local && self.remote_cooldown == 0 {
            self.local_cooldown = cooldown_load;
        }

        self.last_remote = remote;
        self.last_local = local;

        self.remote_cooldown = self.remote_cooldown.saturating_sub(1);
        self.local_cooldown = self.local_cooldown.saturating_sub(1);

        grant_remote
    }

    pub fn remote_cooldown(&self) -> u16 { self.remote_cooldown }
    pub fn local_cooldown(&self) -> u16 { self.local_cooldown }
    pub fn last_remote(&self) -> &T { &self.last_remote }
    pub fn last_local(&self) -> &T { &self.last_local }

    /// Whether the local side armed its lock recently and still holds it.
    pub fn local_holds_lock(&self) -> bool { self.local_cooldown > 0 }

    /// Whether the remote side armed its lock recently and still holds it.
    pub fn remote_holds_lock(&self) -> bool { self.remote_cooldown > 0 }
}
