//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! etc.) should be expressed as futures or asynchronous functions.
//!
//! All routes except `/health` and `/ws/rooms` identify the caller through the [`JwtClaims`] extractor, so a missing
//! or invalid access token is rejected before the handler body runs.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use bazaar_engine::{
    db_types::{DisputeId, NewDispute, OrderId},
    traits::{AccessManagement, DisputeManagement, MessageLog},
    AccessError,
    AccessGate,
    DisputeApi,
    Hub,
};
use log::*;

use crate::{
    auth::JwtClaims,
    data_objects::{
        CreateRoomRequest,
        JoinRoomParams,
        NewDisputeRequest,
        NewDisputeResponse,
        NewImageRequest,
        RoomResponse,
    },
    errors::ServerError,
    ws::spawn_connection,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Rooms  ----------------------------------------------------
/// Lists the chat rooms the hub currently holds. Rooms only live in memory, so this says nothing about which disputes
/// exist in the database.
#[get("/ws/rooms")]
pub async fn rooms(hub: web::Data<Hub>) -> impl Responder {
    let rooms = hub.list_rooms().await.into_iter().map(|id| RoomResponse { id }).collect::<Vec<_>>();
    trace!("💻️ {} rooms are open", rooms.len());
    HttpResponse::Ok().json(rooms)
}

route!(create_room => Post "/ws/create" impl AccessManagement);
/// Opens the chat room for a dispute ahead of the first join. Only the buyer or seller of an open dispute may do so.
pub async fn create_room<B: AccessManagement>(
    claims: JwtClaims,
    body: web::Json<CreateRoomRequest>,
    gate: web::Data<AccessGate<B>>,
    hub: web::Data<Hub>,
) -> Result<HttpResponse, ServerError> {
    let CreateRoomRequest { id } = body.into_inner();
    debug!("💻️ POST create room {id} for {}", claims.user_id);
    gate.authorize(&id, &claims.user_id).await?;
    hub.create_room(id).await;
    Ok(HttpResponse::Created().finish())
}

route!(join_room => Get "/ws/join/{id}" impl AccessManagement, MessageLog);
/// Upgrades the request to a WebSocket and joins the caller to the dispute's chat room.
///
/// The access gate runs before the upgrade, so an unrelated user, a resolved dispute or an unknown dispute get a plain
/// HTTP error response instead of a socket. It runs once more after the connection is registered, in case the dispute
/// was closed in between.
pub async fn join_room<B: AccessManagement + MessageLog + 'static>(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<DisputeId>,
    params: web::Query<JoinRoomParams>,
    claims: JwtClaims,
    gate: web::Data<AccessGate<B>>,
    api: web::Data<DisputeApi<B>>,
    hub: web::Data<Hub>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let user = claims.user_id;
    debug!("💻️ GET join room {id} for {user}");
    gate.authorize(&id, &user).await?;
    let username = params.into_inner().username.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| user.to_string());
    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|e| {
        debug!("💻️ WebSocket handshake with {user} failed. {e}");
        ServerError::WebSocketError(e.to_string())
    })?;
    let ctx = spawn_connection(hub.get_ref().clone(), api, messages, session, user.clone(), username, id.clone()).await;
    // A close that ran between the first check and the registration would leave this connection in a dead room
    match gate.authorize(&id, &user).await {
        Ok(_) => {},
        Err(AccessError::Resolved(_)) | Err(AccessError::DisputeNotFound(_)) => {
            info!("💻️ Dispute {id} was closed while {user} was joining. Closing the room again.");
            hub.close_room(id).await;
        },
        Err(e) => {
            warn!("💻️ Could not re-check access for {user} in room {id}. Dropping the connection. {e}");
            hub.unregister(ctx.key).await;
        },
    }
    Ok(response)
}

//----------------------------------------------   Disputes  ----------------------------------------------------
route!(create_dispute => Post "/disputes" impl DisputeManagement, AccessManagement, MessageLog);
/// Raises a dispute against an order. Responds with the new dispute's id.
pub async fn create_dispute<B>(
    claims: JwtClaims,
    body: web::Json<NewDisputeRequest>,
    api: web::Data<DisputeApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: DisputeManagement + AccessManagement + MessageLog,
{
    let NewDisputeRequest { order_id, dispute, images } = body.into_inner();
    debug!("💻️ POST new dispute for order {order_id} from {}", claims.user_id);
    if dispute.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("The dispute description cannot be empty".to_string()));
    }
    if images.iter().any(|url| url.trim().is_empty()) {
        return Err(ServerError::InvalidRequestBody("Image URLs cannot be empty".to_string()));
    }
    let dispute = api.create_dispute(&claims.user_id, NewDispute::new(order_id, dispute), &images).await?;
    Ok(HttpResponse::Created().json(NewDisputeResponse { id: dispute.id }))
}

route!(dispute_for_order => Get "/disputes/order/{order_id}" impl DisputeManagement, AccessManagement, MessageLog);
/// Fetches the dispute raised against an order, along with its evidence. The dispute's chat room is opened so that the
/// parties can join it straight away.
pub async fn dispute_for_order<B>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<DisputeApi<B>>,
    hub: web::Data<Hub>,
) -> Result<HttpResponse, ServerError>
where
    B: DisputeManagement + AccessManagement + MessageLog,
{
    let order_id = path.into_inner();
    debug!("💻️ GET dispute for order {order_id} for {}", claims.user_id);
    let dispute = api.dispute_for_order(&claims.user_id, &order_id).await?;
    hub.create_room(dispute.dispute.id.clone()).await;
    Ok(HttpResponse::Ok().json(dispute))
}

route!(close_dispute => Put "/disputes/{id}" impl DisputeManagement, AccessManagement, MessageLog);
/// Resolves the dispute. Everyone still connected to its chat room is disconnected.
pub async fn close_dispute<B>(
    claims: JwtClaims,
    path: web::Path<DisputeId>,
    api: web::Data<DisputeApi<B>>,
    hub: web::Data<Hub>,
) -> Result<HttpResponse, ServerError>
where
    B: DisputeManagement + AccessManagement + MessageLog,
{
    let id = path.into_inner();
    debug!("💻️ PUT close dispute {id} for {}", claims.user_id);
    api.close_dispute(&claims.user_id, &id).await?;
    let dropped = hub.close_room(id.clone()).await;
    info!("💻️ Dispute {id} closed. {dropped} live connections were dropped.");
    Ok(HttpResponse::NoContent().finish())
}

route!(add_dispute_image => Post "/disputes/{id}/images" impl DisputeManagement, AccessManagement, MessageLog);
/// Attaches an evidence image (by URL) to an open dispute.
pub async fn add_dispute_image<B>(
    claims: JwtClaims,
    path: web::Path<DisputeId>,
    body: web::Json<NewImageRequest>,
    api: web::Data<DisputeApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: DisputeManagement + AccessManagement + MessageLog,
{
    let id = path.into_inner();
    let NewImageRequest { url } = body.into_inner();
    debug!("💻️ POST image for dispute {id} from {}", claims.user_id);
    if url.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("The image URL cannot be empty".to_string()));
    }
    let image = api.add_image(&claims.user_id, &id, &url).await?;
    Ok(HttpResponse::Created().json(image))
}

route!(message_history => Get "/disputes/{id}/messages" impl DisputeManagement, AccessManagement, MessageLog);
/// The dispute's chat history, oldest message first.
pub async fn message_history<B>(
    claims: JwtClaims,
    path: web::Path<DisputeId>,
    api: web::Data<DisputeApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: DisputeManagement + AccessManagement + MessageLog,
{
    let id = path.into_inner();
    debug!("💻️ GET message history for dispute {id} for {}", claims.user_id);
    let messages = api.message_history(&claims.user_id, &id).await?;
    Ok(HttpResponse::Ok().json(messages))
}
