use crate::shared::{Direction, ExternalRequest, ServedRequest};

/**
 * Pending internal (cab panel) and external (hall call) requests.
 *
 * Both collections keep insertion order and never hold duplicates. Internal requests take
 * priority: while any are pending, a hall call at a floor is only picked up if it wants to go
 * the way the occupants are heading.
 *
 * # Fields
 * - `internal`:            Cab requests, oldest first.
 * - `external`:            Hall calls, oldest first.
 * - `ignore_direction`:    Pick up hall calls in either direction even while occupied.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQueue {
    internal: Vec<usize>,
    external: Vec<ExternalRequest>,
    ignore_direction: bool,
}

impl RequestQueue {
    pub fn new(allow_changing_direction_when_occupied: bool) -> RequestQueue {
        RequestQueue {
            internal: Vec::new(),
            external: Vec::new(),
            ignore_direction: allow_changing_direction_when_occupied,
        }
    }

    /// Appends a cab request. Returns `false` if the floor was already queued.
    pub fn push_internal(&mut self, floor: usize) -> bool {
        if self.internal.contains(&floor) {
            return false;
        }
        self.internal.push(floor);
        true
    }

    /// Appends a hall call. Returns `false` if the same floor and direction was already queued.
    pub fn push_external(&mut self, request: ExternalRequest) -> bool {
        if self.external.contains(&request) {
            return false;
        }
        self.external.push(request);
        true
    }

    pub fn internal(&self) -> &[usize] {
        &self.internal
    }

    pub fn external(&self) -> &[ExternalRequest] {
        &self.external
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.external.is_empty()
    }

    /// Direction the occupants want to go from `floor`: toward the oldest cab request that is
    /// not `floor` itself.
    pub fn heading(&self, floor: usize) -> Option<Direction> {
        self.internal
            .iter()
            .find_map(|&target| Direction::between(floor, target))
    }

    pub fn has_pending_for_floor(&self, floor: usize, direction: Option<Direction>) -> bool {
        self.internal.contains(&floor)
            || self
                .external
                .iter()
                .any(|request| self.external_matches(request, floor, direction))
    }

    /// Removes what the car serves by stopping at `floor`: the cab request for it and one
    /// matching hall call.
    pub fn pop_served(&mut self, floor: usize, direction: Option<Direction>) -> Vec<ServedRequest> {
        let mut served = Vec::new();

        // Match against the queue as it was when the car stopped
        let external_index = self
            .external
            .iter()
            .position(|request| self.external_matches(request, floor, direction));

        if let Some(index) = self.internal.iter().position(|&f| f == floor) {
            self.internal.remove(index);
            served.push(ServedRequest::Internal(floor));
        }
        if let Some(index) = external_index {
            served.push(ServedRequest::External(self.external.remove(index)));
        }

        served
    }

    /// Oldest cab request, else oldest hall call.
    pub fn next_target(&self) -> Option<usize> {
        self.internal
            .first()
            .copied()
            .or_else(|| self.external.first().map(|request| request.floor))
    }

    fn external_matches(
        &self,
        request: &ExternalRequest,
        floor: usize,
        direction: Option<Direction>,
    ) -> bool {
        if request.floor != floor {
            return false;
        }
        if self.internal.is_empty() || self.ignore_direction {
            return true;
        }
        match direction {
            Some(direction) => request.direction == direction,
            None => true,
        }
    }
}
