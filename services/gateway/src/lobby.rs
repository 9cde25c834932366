//! Lobby flows
//!
//! Turns user commands into engine calls and reports back what each
//! affected user should be told. The lobby never talks to a transport
//! itself: every flow returns [`Notice`]s and the caller delivers them.

use std::fmt;
use std::sync::Arc;

use matching_engine::{EngineError, EngineResult, MatchingEngine};
use tracing::{debug, info};
use types::ids::{RoomId, UserId};

use crate::command::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    Welcome,
    SearchStarted,
    AlreadySearching,
    SearchStopped,
    NotSearching,
    RoomCreated { room: RoomId },
    RoomDestroyed { room: RoomId },
    NotInRoom,
    UnknownCommand(String),
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Welcome => write!(
                f,
                "Welcome! /search to find a partner, /unsearch to stop looking, /leave to end a conversation"
            ),
            NoticeKind::SearchStarted => write!(f, "Looking for a partner..."),
            NoticeKind::AlreadySearching => write!(f, "You are already searching"),
            NoticeKind::SearchStopped => write!(f, "Search stopped"),
            NoticeKind::NotSearching => write!(f, "You are not searching"),
            NoticeKind::RoomCreated { room } => write!(f, "Partner found (room {room}). Say hi!"),
            NoticeKind::RoomDestroyed { room } => write!(f, "Conversation in room {room} ended"),
            NoticeKind::NotInRoom => write!(f, "You are not in a conversation"),
            NoticeKind::UnknownCommand(name) => write!(f, "Unknown command /{name}"),
        }
    }
}

/// A message for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub recipient: UserId,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn new(recipient: UserId, kind: NoticeKind) -> Self {
        Self { recipient, kind }
    }
}

/// Where a plain message should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Deliver { room: RoomId, recipients: Vec<UserId> },
    NotInRoom,
}

/// Result of handling one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Notices(Vec<Notice>),
    Route(Route),
}

pub struct Lobby {
    engine: Arc<MatchingEngine>,
}

impl Lobby {
    pub fn new(engine: Arc<MatchingEngine>) -> Self {
        Self { engine }
    }

    /// Dispatch one piece of input: commands go to their flow, anything else
    /// is routed to the sender's room.
    pub fn handle(&self, user: UserId, text: &str) -> EngineResult<Reply> {
        let notices = match Command::parse(text) {
            Some(Command::Start) => self.start(user)?,
            Some(Command::Help) => self.help(user),
            Some(Command::Search) => self.search(user)?,
            Some(Command::Unsearch) => self.unsearch(user)?,
            Some(Command::Leave) => self.leave(user)?,
            Some(Command::Unknown(name)) => {
                vec![Notice::new(user, NoticeKind::UnknownCommand(name))]
            }
            None => return Ok(Reply::Route(self.route(user)?)),
        };
        Ok(Reply::Notices(notices))
    }

    pub fn start(&self, user: UserId) -> EngineResult<Vec<Notice>> {
        self.engine.get_or_create_user(user)?;
        Ok(self.help(user))
    }

    pub fn help(&self, user: UserId) -> Vec<Notice> {
        vec![Notice::new(user, NoticeKind::Welcome)]
    }

    pub fn search(&self, user: UserId) -> EngineResult<Vec<Notice>> {
        let mut notices = match self.live_room(user)? {
            Some(room) => self.destroy(room)?,
            None => Vec::new(),
        };

        let matched = match self.engine.search(user) {
            Ok(matched) => matched,
            Err(EngineError::AlreadySearching(_)) => {
                notices.push(Notice::new(user, NoticeKind::AlreadySearching));
                return Ok(notices);
            }
            Err(e) => return Err(e),
        };
        notices.push(Notice::new(user, NoticeKind::SearchStarted));

        if !matched.is_empty() {
            let mut members = matched;
            members.push(user);
            let room = self.engine.add_room(&members)?;
            info!(room = %room, members = members.len(), "Paired users");
            notices.extend(
                members
                    .into_iter()
                    .map(|member| Notice::new(member, NoticeKind::RoomCreated { room })),
            );
        }
        Ok(notices)
    }

    pub fn unsearch(&self, user: UserId) -> EngineResult<Vec<Notice>> {
        if !self.engine.is_searching(user)? {
            return Ok(vec![Notice::new(user, NoticeKind::NotSearching)]);
        }
        self.engine.unsearch(user)?;
        Ok(vec![Notice::new(user, NoticeKind::SearchStopped)])
    }

    pub fn leave(&self, user: UserId) -> EngineResult<Vec<Notice>> {
        match self.live_room(user)? {
            Some(room) => self.destroy(room),
            None => Ok(vec![Notice::new(user, NoticeKind::NotInRoom)]),
        }
    }

    /// Recipients for a message from `sender`. The message itself is never
    /// looked at.
    pub fn route(&self, sender: UserId) -> EngineResult<Route> {
        let Some(room_id) = self.engine.get_user(sender)?.current_room else {
            return Ok(Route::NotInRoom);
        };
        match self.engine.get_room(room_id) {
            Ok(room) => Ok(Route::Deliver {
                room: room_id,
                recipients: room.others(sender).collect(),
            }),
            Err(e) if e.is_not_found() => Ok(Route::NotInRoom),
            Err(e) => Err(e),
        }
    }

    // Room the user points at, if it still exists.
    fn live_room(&self, user: UserId) -> EngineResult<Option<RoomId>> {
        match self.engine.get_user(user)?.current_room {
            Some(room) if self.engine.is_room_exist(room)? => Ok(Some(room)),
            Some(room) => {
                debug!(user = %user, room = %room, "Ignoring stale room pointer");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn destroy(&self, room: RoomId) -> EngineResult<Vec<Notice>> {
        let members = match self.engine.del_room(room) {
            Ok(members) => members,
            // Someone else tore it down first
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(members
            .into_iter()
            .map(|member| Notice::new(member, NoticeKind::RoomDestroyed { room }))
            .collect())
    }
}
