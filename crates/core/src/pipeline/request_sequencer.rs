/// Handle for one submitted request.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request {in_flight} is still in flight")]
pub struct SequencerBusy {
    pub in_flight: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// Not newer than the last accepted response; must not be rendered.
    Stale,
}

/// Single-flight guard for inference requests.
///
/// At most one ticket is outstanding. Responses are accepted only in
/// increasing sequence order, so a response whose request was abandoned can
/// never overwrite a newer render.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    next_seq: u64,
    in_flight: Option<u64>,
    last_accepted: Option<u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Result<RequestTicket, SequencerBusy> {
        if let Some(in_flight) = self.in_flight {
            return Err(SequencerBusy { in_flight });
        }
        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        Ok(RequestTicket { seq: self.next_seq })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Records the response for `ticket` and decides whether it may be
    /// rendered.
    pub fn complete(&mut self, ticket: RequestTicket) -> Admission {
        self.release(&ticket);
        match self.last_accepted {
            Some(last) if ticket.seq <= last => Admission::Stale,
            _ => {
                self.last_accepted = Some(ticket.seq);
                Admission::Accepted
            }
        }
    }

    /// Gives up on `ticket` without accepting its response.
    pub fn abandon(&mut self, ticket: RequestTicket) {
        self.release(&ticket);
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted
    }

    fn release(&mut self, ticket: &RequestTicket) {
        if self.in_flight == Some(ticket.seq) {
            self.in_flight = None;
        }
    }
}
