use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::actions::PlayerAction;
use crate::domain::rules::Slot;
use crate::domain::state::PlayerIdentity;
use crate::error::AppError;
use crate::extractors::identity::Caller;
use crate::extractors::room_id::RoomPath;
use crate::rooms::RoomHandle;
use crate::state::app_state::AppState;
use crate::ws::hub::{RoomBroadcast, WsHub};
use crate::ws::protocol::{ClientMsg, ProtocolError, ServerMsg, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// `GET /api/ws/rooms/{room_id}`: attach a socket to a room. Seated players
/// count toward presence; anyone else may watch.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    room: RoomPath,
    caller: Caller,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let handle = app_state
        .rooms()
        .get(&room.into_inner())
        .await
        .map_err(AppError::from)?;
    let session = WsSession::new(handle, caller.into_inner(), app_state.hub());
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    room: RoomHandle,
    identity: PlayerIdentity,
    hub: Arc<WsHub>,
    hub_token: Option<Uuid>,
    /// Set once the room has counted this connection toward presence.
    slot: Option<Slot>,
    last_heartbeat: Instant,
    hello_done: bool,
}

impl WsSession {
    fn new(room: RoomHandle, identity: PlayerIdentity, hub: Arc<WsHub>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            room,
            identity,
            hub,
            hub_token: None,
            slot: None,
            last_heartbeat: Instant::now(),
            hello_done: false,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "Failed to serialize outbound frame"),
        }
    }

    fn send_protocol_error(
        ctx: &mut ws::WebsocketContext<Self>,
        error: ProtocolError,
        message: &str,
        request_id: Option<String>,
    ) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code: error.as_str().to_string(),
                message: message.to_string(),
                request_id,
            },
        );
    }

    fn close_with_error(&self, ctx: &mut ws::WebsocketContext<Self>, error: ProtocolError, message: &str) {
        Self::send_protocol_error(ctx, error, message, None);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Policy)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, room_id = %actor.room.id(), "Heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    /// Count this socket toward the caller's presence. Blocks the mailbox so
    /// `hello` always sees the resolved slot.
    fn join_presence(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let room = self.room.clone();
        let identity = self.identity.clone();
        ctx.wait(
            async move { room.connect(identity).await }
                .into_actor(self)
                .map(|res, actor, ctx| match res {
                    Ok(presence) => actor.slot = presence.slot,
                    Err(err) => {
                        warn!(conn_id = %actor.conn_id, error = %err, "Room rejected connection");
                        let app: AppError = err.into();
                        Self::send_json(
                            ctx,
                            &ServerMsg::Error {
                                code: app.code().as_str().to_string(),
                                message: app.detail(),
                                request_id: None,
                            },
                        );
                        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                        ctx.stop();
                    }
                }),
        );
    }

    fn on_hello(&mut self, protocol: i32, ctx: &mut ws::WebsocketContext<Self>) {
        if protocol != PROTOCOL_VERSION {
            self.close_with_error(ctx, ProtocolError::BadProtocol, "unsupported protocol version");
            return;
        }
        let room = self.room.clone();
        ctx.spawn(
            async move { room.snapshot().await }
                .into_actor(self)
                .map(|res, actor, ctx| match res {
                    Ok(snapshot) => {
                        actor.hello_done = true;
                        Self::send_json(
                            ctx,
                            &ServerMsg::HelloAck {
                                protocol: PROTOCOL_VERSION,
                                room_id: actor.room.id().to_string(),
                                slot: actor.slot,
                            },
                        );
                        Self::send_json(
                            ctx,
                            &ServerMsg::Snapshot {
                                version: snapshot.version,
                                snapshot,
                            },
                        );
                    }
                    Err(err) => {
                        warn!(conn_id = %actor.conn_id, error = %err, "Snapshot for hello failed");
                        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                        ctx.stop();
                    }
                }),
        );
    }

    fn on_action(
        &mut self,
        action: PlayerAction,
        request_id: Option<String>,
        expected_version: Option<i32>,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        if !self.hello_done {
            Self::send_protocol_error(ctx, ProtocolError::HelloRequired, "send hello first", request_id);
            return;
        }
        if self.slot.is_none() {
            Self::send_protocol_error(
                ctx,
                ProtocolError::Spectator,
                "spectators cannot act",
                request_id,
            );
            return;
        }
        debug!(conn_id = %self.conn_id, action = action.name(), "Action over socket");

        let room = self.room.clone();
        let identity = self.identity.clone();
        ctx.spawn(
            async move { room.act(identity, action, expected_version).await }
                .into_actor(self)
                .map(move |res, _actor, ctx| {
                    let frame = match res {
                        Ok(ack) => ServerMsg::Ack {
                            request_id,
                            version: ack.version,
                        },
                        Err(err) => {
                            let app: AppError = err.into();
                            ServerMsg::Error {
                                code: app.code().as_str().to_string(),
                                message: app.detail(),
                                request_id,
                            }
                        }
                    };
                    Self::send_json(ctx, &frame);
                }),
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, room_id = %self.room.id(), "Socket opened");
        self.hub_token = Some(
            self.hub
                .register(self.room.id(), ctx.address().recipient::<RoomBroadcast>()),
        );
        self.start_heartbeat(ctx);
        self.join_presence(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(token) = self.hub_token.take() {
            self.hub.unregister(self.room.id(), token);
        }
        if let Some(slot) = self.slot.take() {
            let room = self.room.clone();
            actix::spawn(async move { room.disconnect(slot).await });
        }
        info!(conn_id = %self.conn_id, room_id = %self.room.id(), "Socket closed");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "Socket protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
                return;
            }
        };
        self.last_heartbeat = Instant::now();

        match msg {
            ws::Message::Ping(payload) => ctx.pong(&payload),
            ws::Message::Pong(_) | ws::Message::Continuation(_) | ws::Message::Nop => {}
            ws::Message::Text(text) => match serde_json::from_str::<ClientMsg>(&text) {
                Ok(ClientMsg::Hello { protocol }) => self.on_hello(protocol, ctx),
                Ok(ClientMsg::Action {
                    action,
                    request_id,
                    expected_version,
                }) => self.on_action(action, request_id, expected_version, ctx),
                Err(err) => {
                    debug!(conn_id = %self.conn_id, error = %err, "Unparseable frame");
                    Self::send_protocol_error(ctx, ProtocolError::BadRequest, "malformed frame", None);
                }
            },
            ws::Message::Binary(_) => {
                self.close_with_error(ctx, ProtocolError::BadRequest, "binary frames are not supported");
            }
            ws::Message::Close(reason) => {
                ctx.close(reason);
                ctx.stop();
            }
        }
    }
}

impl Handler<RoomBroadcast> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: RoomBroadcast, ctx: &mut Self::Context) {
        if !self.hello_done {
            return;
        }
        let batch = msg.0;
        Self::send_json(
            ctx,
            &ServerMsg::Events {
                version: batch.version,
                events: batch.events.clone(),
                snapshot: batch.snapshot.clone(),
            },
        );
    }
}
