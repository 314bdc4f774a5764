//! Chat view model: history snapshots flattened into bubbles, plus the
//! outgoing messages that the server has not confirmed yet.

use std::cell::Cell;
use std::rc::Rc;

use yew::prelude::*;

use crate::models::{Answer, ChatSession, NewQuery, Query, QueryStatus};

/* -------------------------------------------------------------------------- */
/*                                 bubbles                                    */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Pending,
    /// Accepted by the server; kept until the reload with this ticket (or a newer one) lands.
    Confirmed { refresh_ticket: u64 },
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outgoing {
    pub local_id: u64,
    pub text:     String,
    pub request:  NewQuery,
    pub delivery: Delivery,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Bubble {
    User { query_id: i64, text: String, status: QueryStatus },
    Ai { answer_id: i64, query_id: i64, text: String },
    Outgoing(Outgoing),
}

/// One user bubble per query, followed by its AI answers. Tutor answers stay out.
pub fn flatten_session(session: &ChatSession) -> Vec<Bubble> {
    let mut bubbles = Vec::new();
    for q in &session.queries {
        bubbles.push(Bubble::User {
            query_id: q.query_id,
            text:     q.content.clone(),
            status:   q.status,
        });
        for a in q.answers.iter().filter(|a| a.is_ai()) {
            bubbles.push(Bubble::Ai {
                answer_id: a.answer_id,
                query_id:  q.query_id,
                text:      a.content.clone(),
            });
        }
    }
    bubbles
}

/// Queries of every session that went to a tutor, in server order.
pub fn escalated_queries(history: &[ChatSession]) -> Vec<&Query> {
    history
        .iter()
        .flat_map(|s| s.queries.iter())
        .filter(|q| q.status.is_escalation())
        .collect()
}

/// The reply shown for an escalated query: first tutor-authored answer.
pub fn tutor_reply(query: &Query) -> Option<&Answer> {
    query.answers.iter().find(|a| a.tutor_id.is_some())
}

/// Text of the optimistic bubble for a message about to be sent.
pub fn outgoing_text(text: &str, has_image: bool) -> String {
    if has_image {
        format!("{text} [Image Attached]")
    } else {
        text.to_string()
    }
}

/// Request for the composer content; `None` when there is nothing to send.
pub fn compose(text: &str, image: Option<String>) -> Option<NewQuery> {
    if text.trim().is_empty() && image.is_none() {
        return None;
    }
    let content = if text.is_empty() { "Analyze this image".to_string() } else { text.to_string() };
    Some(NewQuery { content, image })
}

/* -------------------------------------------------------------------------- */
/*                              conversation                                  */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActiveView {
    #[default]
    Welcome,
    Session(i64),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conversation {
    history:  Vec<ChatSession>,
    active:   ActiveView,
    outgoing: Vec<Outgoing>,
    /// newest history ticket applied so far
    applied:  u64,
    /// activate the newest session once a snapshot at least this new lands
    follow_from: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConversationAction {
    /// Snapshot from `GET /history`, stamped with the ticket its request took.
    HistoryLoaded { ticket: u64, sessions: Vec<ChatSession> },
    Select(i64),
    NewChat,
    Queue { local_id: u64, text: String, request: NewQuery },
    /// Server accepted `local_id`; the reload that picks it up took `refresh_ticket`.
    Delivered { local_id: u64, refresh_ticket: u64 },
    Failed(u64),
    Retry(u64),
    Discard(u64),
}

impl Conversation {
    pub fn history(&self) -> &[ChatSession] {
        &self.history
    }

    pub fn active(&self) -> ActiveView {
        self.active
    }

    #[cfg(test)]
    pub fn outgoing(&self, local_id: u64) -> Option<&Outgoing> {
        self.outgoing.iter().find(|o| o.local_id == local_id)
    }

    pub fn is_waiting(&self) -> bool {
        self.outgoing.iter().any(|o| o.delivery == Delivery::Pending)
    }

    /// Placeholder instead of bubbles: no session picked, nothing in flight.
    pub fn shows_welcome(&self) -> bool {
        self.active == ActiveView::Welcome && self.outgoing.is_empty()
    }

    pub fn bubbles(&self) -> Vec<Bubble> {
        let mut bubbles = match self.active {
            ActiveView::Session(id) => self
                .history
                .iter()
                .find(|s| s.session_id == id)
                .map(flatten_session)
                .unwrap_or_default(),
            ActiveView::Welcome => Vec::new(),
        };
        bubbles.extend(self.outgoing.iter().cloned().map(Bubble::Outgoing));
        bubbles
    }

    pub fn escalations(&self) -> Vec<&Query> {
        escalated_queries(&self.history)
    }

    pub fn apply(&mut self, action: ConversationAction) {
        match action {
            ConversationAction::HistoryLoaded { ticket, sessions } => {
                if ticket <= self.applied {
                    log::debug!("dropping stale history #{ticket} (have #{})", self.applied);
                    return;
                }
                self.applied = ticket;
                self.history = sessions;
                // snapshots issued before the send cannot contain the message yet
                self.outgoing.retain(|o| match o.delivery {
                    Delivery::Confirmed { refresh_ticket } => refresh_ticket > ticket,
                    _ => true,
                });

                let follow = self.follow_from.is_some_and(|from| ticket >= from);
                if follow {
                    self.follow_from = None;
                    if let Some(first) = self.history.first() {
                        self.active = ActiveView::Session(first.session_id);
                    }
                } else if let ActiveView::Session(id) = self.active {
                    if !self.history.iter().any(|s| s.session_id == id) {
                        self.active = ActiveView::Welcome;
                    }
                }
            }
            ConversationAction::Select(id) => {
                if self.history.iter().any(|s| s.session_id == id) {
                    self.active = ActiveView::Session(id);
                }
            }
            ConversationAction::NewChat => {
                self.active = ActiveView::Welcome;
            }
            ConversationAction::Queue { local_id, text, request } => {
                self.outgoing.push(Outgoing { local_id, text, request, delivery: Delivery::Pending });
            }
            ConversationAction::Delivered { local_id, refresh_ticket } => {
                self.set_delivery(local_id, Delivery::Confirmed { refresh_ticket });
                self.follow_from = Some(refresh_ticket);
            }
            ConversationAction::Failed(id) => self.set_delivery(id, Delivery::Failed),
            ConversationAction::Retry(id) => self.set_delivery(id, Delivery::Pending),
            ConversationAction::Discard(id) => self.outgoing.retain(|o| o.local_id != id),
        }
    }

    fn set_delivery(&mut self, local_id: u64, delivery: Delivery) {
        if let Some(o) = self.outgoing.iter_mut().find(|o| o.local_id == local_id) {
            o.delivery = delivery;
        }
    }
}

impl Reducible for Conversation {
    type Action = ConversationAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

/* -------------------------------------------------------------------------- */
/*                        tickets / local message ids                         */
/* -------------------------------------------------------------------------- */

/// Monotonic counter handed out synchronously, before any request leaves.
#[derive(Debug, Default)]
pub struct Sequence(Cell<u64>);

impl Sequence {
    pub fn next(&self) -> u64 {
        let n = self.0.get() + 1;
        self.0.set(n);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(id: i64, text: &str, tutor: Option<i64>) -> Answer {
        Answer { answer_id: id, content: text.into(), tutor_id: tutor, timestamp: None }
    }

    fn query(id: i64, text: &str, status: QueryStatus, answers: Vec<Answer>) -> Query {
        Query { query_id: id, content: text.into(), status, timestamp: None, answers }
    }

    fn session(id: i64, queries: Vec<Query>) -> ChatSession {
        ChatSession { session_id: id, started_at: None, queries }
    }

    fn loaded(ticket: u64, sessions: Vec<ChatSession>) -> ConversationAction {
        ConversationAction::HistoryLoaded { ticket, sessions }
    }

    fn delivered(local_id: u64, refresh_ticket: u64) -> ConversationAction {
        ConversationAction::Delivered { local_id, refresh_ticket }
    }

    fn queue(c: &mut Conversation, id: u64, text: &str) {
        let request = NewQuery { content: text.into(), image: None };
        c.apply(ConversationAction::Queue { local_id: id, text: text.into(), request });
    }

    #[test]
    fn flattens_question_then_ai_answer() {
        let s = session(1, vec![query(1, "2+2?", QueryStatus::Answered, vec![answer(9, "4", None)])]);
        assert_eq!(
            flatten_session(&s),
            vec![
                Bubble::User { query_id: 1, text: "2+2?".into(), status: QueryStatus::Answered },
                Bubble::Ai { answer_id: 9, query_id: 1, text: "4".into() },
            ]
        );
    }

    #[test]
    fn tutor_answers_stay_out_of_the_feed() {
        let s = session(1, vec![
            query(1, "a", QueryStatus::Resolved, vec![
                answer(10, "ai one", None),
                answer(11, "tutor", Some(5)),
                answer(12, "ai two", None),
            ]),
            query(2, "b", QueryStatus::Answered, vec![answer(13, "ai three", None)]),
        ]);
        let texts: Vec<_> = flatten_session(&s)
            .into_iter()
            .map(|b| match b {
                Bubble::User { text, .. } | Bubble::Ai { text, .. } => text,
                Bubble::Outgoing(o) => o.text,
            })
            .collect();
        assert_eq!(texts, ["a", "ai one", "ai two", "b", "ai three"]);
    }

    #[test]
    fn escalation_shows_only_the_tutor_reply() {
        let q = query(7, "hard one", QueryStatus::Escalated, vec![
            answer(1, "ai guess", None),
            answer(2, "tutor fix", Some(5)),
        ]);
        let history = vec![session(1, vec![q, query(8, "easy", QueryStatus::Answered, vec![])])];

        let escalated = escalated_queries(&history);
        assert_eq!(escalated.len(), 1);
        let reply = tutor_reply(escalated[0]).unwrap();
        assert_eq!(reply.answer_id, 2);
        assert_eq!(reply.tutor_id, Some(5));
    }

    #[test]
    fn first_tutor_reply_wins() {
        let q = query(7, "x", QueryStatus::Resolved, vec![
            answer(1, "first", Some(3)),
            answer(2, "second", Some(4)),
        ]);
        assert_eq!(tutor_reply(&q).unwrap().content, "first");
        assert!(tutor_reply(&query(8, "y", QueryStatus::Escalated, vec![answer(3, "ai", None)])).is_none());
    }

    #[test]
    fn escalations_span_all_sessions_in_order() {
        let history = vec![
            session(2, vec![query(5, "new", QueryStatus::Escalated, vec![])]),
            session(1, vec![
                query(1, "old", QueryStatus::Resolved, vec![]),
                query(2, "fine", QueryStatus::Answered, vec![]),
            ]),
        ];
        let ids: Vec<_> = escalated_queries(&history).iter().map(|q| q.query_id).collect();
        assert_eq!(ids, [5, 1]);
    }

    #[test]
    fn composer_rules() {
        assert_eq!(compose("   ", None), None);
        assert_eq!(
            compose("", Some("data:image/png;base64,AA".into())).unwrap().content,
            "Analyze this image"
        );
        assert_eq!(compose("why?", None).unwrap(), NewQuery { content: "why?".into(), image: None });
        assert_eq!(outgoing_text("look", true), "look [Image Attached]");
        assert_eq!(outgoing_text("look", false), "look");
    }

    #[test]
    fn stale_snapshot_is_dropped() {
        let mut c = Conversation::default();
        c.apply(loaded(2, vec![session(20, vec![])]));
        c.apply(loaded(1, vec![session(10, vec![])]));
        assert_eq!(c.history()[0].session_id, 20);

        c.apply(loaded(3, vec![session(30, vec![])]));
        assert_eq!(c.history()[0].session_id, 30);
    }

    #[test]
    fn confirmed_message_gives_way_to_server_truth() {
        let mut c = Conversation::default();
        queue(&mut c, 1, "hello");
        assert!(c.is_waiting());
        assert!(!c.shows_welcome());

        c.apply(delivered(1, 1));
        assert!(!c.is_waiting());
        let s = session(4, vec![query(1, "hello", QueryStatus::Answered, vec![answer(2, "hi", None)])]);
        c.apply(loaded(1, vec![s]));

        assert_eq!(c.active(), ActiveView::Session(4));
        assert_eq!(c.bubbles().len(), 2);
        assert!(c.bubbles().iter().all(|b| !matches!(b, Bubble::Outgoing(_))));
    }

    #[test]
    fn older_reload_keeps_a_confirmed_message() {
        let mut c = Conversation::default();
        let seq = Sequence::default();

        // reload issued before the send (after an escalation, say)
        let early = seq.next();
        let local_id = seq.next();
        queue(&mut c, local_id, "derivative of x^2?");
        let refresh = seq.next();
        c.apply(delivered(local_id, refresh));

        c.apply(loaded(early, vec![]));
        assert!(matches!(
            c.outgoing(local_id).map(|o| o.delivery),
            Some(Delivery::Confirmed { .. })
        ));
        assert!(!c.shows_welcome());
        assert_eq!(c.bubbles().len(), 1);

        let s = session(9, vec![query(1, "derivative of x^2?", QueryStatus::Answered, vec![])]);
        c.apply(loaded(refresh, vec![s]));
        assert!(c.outgoing(local_id).is_none());
        assert_eq!(c.active(), ActiveView::Session(9));
    }

    #[test]
    fn newer_reload_still_follows_the_latest_session() {
        let mut c = Conversation::default();
        queue(&mut c, 1, "hi");
        c.apply(delivered(1, 2));

        // ticket 3 resolves first, the follow-up reload #2 is then stale
        c.apply(loaded(3, vec![session(7, vec![]), session(6, vec![])]));
        c.apply(loaded(2, vec![session(6, vec![])]));

        assert!(c.outgoing(1).is_none());
        assert_eq!(c.active(), ActiveView::Session(7));

        // the flag is spent: a later reload keeps the user's choice
        c.apply(ConversationAction::Select(6));
        c.apply(loaded(4, vec![session(8, vec![]), session(7, vec![]), session(6, vec![])]));
        assert_eq!(c.active(), ActiveView::Session(6));
    }

    #[test]
    fn failed_message_stays_until_discarded() {
        let mut c = Conversation::default();
        queue(&mut c, 1, "lost");
        c.apply(ConversationAction::Failed(1));
        c.apply(loaded(1, vec![]));

        assert_eq!(c.outgoing(1).unwrap().delivery, Delivery::Failed);
        assert!(!c.is_waiting());

        c.apply(ConversationAction::Retry(1));
        assert_eq!(c.outgoing(1).unwrap().delivery, Delivery::Pending);

        c.apply(ConversationAction::Failed(1));
        c.apply(ConversationAction::Discard(1));
        assert!(c.outgoing(1).is_none());
        assert!(c.shows_welcome());
    }

    #[test]
    fn outgoing_bubbles_follow_the_active_session() {
        let mut c = Conversation::default();
        c.apply(loaded(1, vec![session(4, vec![query(1, "q", QueryStatus::Answered, vec![])])]));
        c.apply(ConversationAction::Select(4));
        queue(&mut c, 1, "next");

        let bubbles = c.bubbles();
        assert_eq!(bubbles.len(), 2);
        assert!(matches!(&bubbles[1], Bubble::Outgoing(o) if o.text == "next"));
    }

    #[test]
    fn selection_and_new_chat() {
        let mut c = Conversation::default();
        c.apply(loaded(1, vec![session(4, vec![]), session(3, vec![])]));
        assert_eq!(c.active(), ActiveView::Welcome);

        c.apply(ConversationAction::Select(3));
        assert_eq!(c.active(), ActiveView::Session(3));

        c.apply(ConversationAction::Select(99));
        assert_eq!(c.active(), ActiveView::Session(3));

        c.apply(ConversationAction::NewChat);
        assert!(c.shows_welcome());
    }

    #[test]
    fn vanished_session_falls_back_to_welcome() {
        let mut c = Conversation::default();
        c.apply(loaded(1, vec![session(4, vec![])]));
        c.apply(ConversationAction::Select(4));
        c.apply(loaded(2, vec![session(5, vec![])]));
        assert_eq!(c.active(), ActiveView::Welcome);
    }

    #[test]
    fn sequence_is_monotonic() {
        let seq = Sequence::default();
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
    }
}
