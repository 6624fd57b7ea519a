use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};

use gatepass_domain::id::{OfferId, OrderId, OtpChallengeId, TicketId, UserId};
use gatepass_domain::role::RoleSet;
use gatepass_tickets_schema::{
    offers, orders, otp_challenges, outbox_events, tickets, user_roles, users,
};

use crate::domain::repository::{
    OfferRepository, OrderRepository, OtpChallengeRepository, TicketRepository, UserRepository,
};
use crate::domain::types::{
    ConsumeOutcome, NewOrder, NewOtpChallenge, NewTicket, NewUser, Offer, OfferDraft, Order,
    OtpChallenge, OutboxEvent, Ticket, User,
};
use crate::error::TicketingError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: Arc<DatabaseConnection>,
}

impl DbUserRepository {
    async fn with_roles(&self, model: users::Model) -> Result<User, TicketingError> {
        let roles = load_roles(self.db.as_ref(), model.id)
            .await
            .context("load user roles")?;
        Ok(user_from_model(model, roles))
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, TicketingError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .context("find user by email")?;
        match model {
            Some(model) => Ok(Some(self.with_roles(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, TicketingError> {
        let model = users::Entity::find_by_id(i64::from(id))
            .one(self.db.as_ref())
            .await
            .context("find user by id")?;
        match model {
            Some(model) => Ok(Some(self.with_roles(model).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, user: &NewUser) -> Result<User, TicketingError> {
        let txn = self.db.begin().await.context("begin user transaction")?;

        let model = match insert_user(&txn, user).await {
            Ok(model) => model,
            Err(e) if is_unique_violation(&e) => return Err(TicketingError::EmailAlreadyUsed),
            Err(e) => return Err(anyhow::Error::new(e).context("insert user").into()),
        };
        for role in user.roles.iter() {
            user_roles::ActiveModel {
                user_id: Set(model.id),
                role: Set(role.as_str().to_owned()),
            }
            .insert(&txn)
            .await
            .context("insert user role")?;
        }

        txn.commit().await.context("commit user transaction")?;
        Ok(user_from_model(model, user.roles.clone()))
    }
}

async fn insert_user(txn: &DatabaseTransaction, user: &NewUser) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        first_name: Set(user.first_name.clone()),
        last_name: Set(user.last_name.clone()),
        k_user: Set(user.k_user.clone()),
        created_at: Set(user.created_at),
        ..Default::default()
    }
    .insert(txn)
    .await
}

async fn load_roles<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<RoleSet, DbErr> {
    let rows = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    Ok(RoleSet::from_strings(rows.iter().map(|r| r.role.as_str())))
}

fn user_from_model(model: users::Model, roles: RoleSet) -> User {
    User {
        id: UserId(model.id),
        email: model.email,
        password_hash: model.password_hash,
        first_name: model.first_name,
        last_name: model.last_name,
        k_user: model.k_user,
        roles,
        created_at: model.created_at,
    }
}

// ── OTP challenge repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpChallengeRepository {
    pub db: Arc<DatabaseConnection>,
}

impl OtpChallengeRepository for DbOtpChallengeRepository {
    async fn create_with_outbox(
        &self,
        challenge: &NewOtpChallenge,
        event: &OutboxEvent,
        max_active: u64,
    ) -> Result<OtpChallenge, TicketingError> {
        let txn = self.db.begin().await.context("begin otp transaction")?;

        // Row lock on the user serializes concurrent logins until commit.
        users::Entity::find_by_id(i64::from(challenge.user_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock user for otp issuance")?;

        let active = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::UserId.eq(i64::from(challenge.user_id)))
            .filter(otp_challenges::Column::ConsumedAt.is_null())
            .filter(otp_challenges::Column::ExpiresAt.gt(challenge.issued_at))
            .count(&txn)
            .await
            .context("count active otp challenges")?;
        if active >= max_active {
            return Err(TicketingError::TooManyChallenges);
        }

        let model = insert_challenge(&txn, challenge)
            .await
            .context("insert otp challenge")?;
        insert_outbox_event(&txn, event, challenge.issued_at)
            .await
            .context("insert otp outbox event")?;

        txn.commit().await.context("commit otp transaction")?;
        Ok(challenge_from_model(model))
    }

    async fn find_latest(&self, user_id: UserId) -> Result<Option<OtpChallenge>, TicketingError> {
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::UserId.eq(i64::from(user_id)))
            .order_by_desc(otp_challenges::Column::Id)
            .one(self.db.as_ref())
            .await
            .context("find latest otp challenge")?;
        Ok(model.map(challenge_from_model))
    }

    async fn mark_consumed(
        &self,
        id: OtpChallengeId,
        now: DateTime<Utc>,
    ) -> Result<bool, TicketingError> {
        let result = otp_challenges::Entity::update_many()
            .col_expr(otp_challenges::Column::ConsumedAt, Expr::value(now))
            .filter(otp_challenges::Column::Id.eq(i64::from(id)))
            .filter(otp_challenges::Column::ConsumedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .context("mark otp challenge consumed")?;
        Ok(result.rows_affected == 1)
    }
}

async fn insert_challenge(
    txn: &DatabaseTransaction,
    challenge: &NewOtpChallenge,
) -> Result<otp_challenges::Model, DbErr> {
    otp_challenges::ActiveModel {
        user_id: Set(i64::from(challenge.user_id)),
        code: Set(challenge.code.clone()),
        issued_at: Set(challenge.issued_at),
        expires_at: Set(challenge.expires_at),
        consumed_at: Set(None),
        ..Default::default()
    }
    .insert(txn)
    .await
}

async fn insert_outbox_event(
    txn: &DatabaseTransaction,
    event: &OutboxEvent,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        created_at: Set(now),
        delivered_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn challenge_from_model(model: otp_challenges::Model) -> OtpChallenge {
    OtpChallenge {
        id: OtpChallengeId(model.id),
        user_id: UserId(model.user_id),
        code: model.code,
        issued_at: model.issued_at,
        expires_at: model.expires_at,
        consumed_at: model.consumed_at,
    }
}

// ── Offer repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOfferRepository {
    pub db: Arc<DatabaseConnection>,
}

impl OfferRepository for DbOfferRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<Offer>, TicketingError> {
        let mut query = offers::Entity::find();
        if active_only {
            query = query.filter(offers::Column::Active.eq(true));
        }
        let models = query
            .order_by_asc(offers::Column::Id)
            .all(self.db.as_ref())
            .await
            .context("list offers")?;
        Ok(models.into_iter().map(offer_from_model).collect())
    }

    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, TicketingError> {
        let model = offers::Entity::find_by_id(i64::from(id))
            .one(self.db.as_ref())
            .await
            .context("find offer by id")?;
        Ok(model.map(offer_from_model))
    }

    async fn code_taken(
        &self,
        code: &str,
        except: Option<OfferId>,
    ) -> Result<bool, TicketingError> {
        let mut query = offers::Entity::find().filter(offers::Column::Code.eq(code));
        if let Some(except) = except {
            query = query.filter(offers::Column::Id.ne(i64::from(except)));
        }
        let count = query.count(self.db.as_ref()).await.context("check offer code")?;
        Ok(count > 0)
    }

    async fn create(&self, draft: &OfferDraft) -> Result<Offer, TicketingError> {
        let result = offers::ActiveModel {
            code: Set(draft.code.clone()),
            name: Set(draft.name.clone()),
            description: Set(draft.description.clone()),
            seats: Set(draft.seats),
            price_cents: Set(draft.price_cents),
            active: Set(draft.active),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await;
        match result {
            Ok(model) => Ok(offer_from_model(model)),
            Err(e) if is_unique_violation(&e) => Err(TicketingError::OfferCodeTaken),
            Err(e) => Err(anyhow::Error::new(e).context("create offer").into()),
        }
    }

    async fn update(
        &self,
        id: OfferId,
        draft: &OfferDraft,
    ) -> Result<Option<Offer>, TicketingError> {
        let Some(model) = offers::Entity::find_by_id(i64::from(id))
            .one(self.db.as_ref())
            .await
            .context("find offer for update")?
        else {
            return Ok(None);
        };
        let mut active = model.into_active_model();
        active.code = Set(draft.code.clone());
        active.name = Set(draft.name.clone());
        active.description = Set(draft.description.clone());
        active.seats = Set(draft.seats);
        active.price_cents = Set(draft.price_cents);
        active.active = Set(draft.active);
        match active.update(self.db.as_ref()).await {
            Ok(model) => Ok(Some(offer_from_model(model))),
            Err(e) if is_unique_violation(&e) => Err(TicketingError::OfferCodeTaken),
            Err(e) => Err(anyhow::Error::new(e).context("update offer").into()),
        }
    }

    async fn set_active(
        &self,
        id: OfferId,
        active: bool,
    ) -> Result<Option<Offer>, TicketingError> {
        let Some(model) = offers::Entity::find_by_id(i64::from(id))
            .one(self.db.as_ref())
            .await
            .context("find offer for activation")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        am.active = Set(active);
        let model = am.update(self.db.as_ref()).await.context("set offer active")?;
        Ok(Some(offer_from_model(model)))
    }

    async fn delete(&self, id: OfferId) -> Result<bool, TicketingError> {
        let result = offers::Entity::delete_by_id(i64::from(id))
            .exec(self.db.as_ref())
            .await
            .context("delete offer")?;
        Ok(result.rows_affected > 0)
    }

    async fn has_tickets(&self, id: OfferId) -> Result<bool, TicketingError> {
        let count = tickets::Entity::find()
            .filter(tickets::Column::OfferId.eq(i64::from(id)))
            .count(self.db.as_ref())
            .await
            .context("count tickets for offer")?;
        Ok(count > 0)
    }

    async fn count(&self) -> Result<u64, TicketingError> {
        let count = offers::Entity::find()
            .count(self.db.as_ref())
            .await
            .context("count offers")?;
        Ok(count)
    }
}

fn offer_from_model(model: offers::Model) -> Offer {
    Offer {
        id: OfferId(model.id),
        code: model.code,
        name: model.name,
        description: model.description,
        seats: model.seats,
        price_cents: model.price_cents,
        active: model.active,
    }
}

// ── Order repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: Arc<DatabaseConnection>,
}

impl OrderRepository for DbOrderRepository {
    async fn create_with_tickets(
        &self,
        order: &NewOrder,
        tickets: &[NewTicket],
    ) -> Result<(Order, Vec<Ticket>), TicketingError> {
        // Dropping `txn` without commit rolls everything back.
        let txn = self.db.begin().await.context("begin checkout transaction")?;

        let order_model = orders::ActiveModel {
            user_id: Set(i64::from(order.user_id)),
            purchase_key: Set(order.purchase_key.clone()),
            created_at: Set(order.created_at),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("insert order")?;

        let mut issued = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            match insert_ticket(&txn, order_model.id, ticket).await {
                Ok(model) => issued.push(ticket_from_model(model)),
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!(order_id = order_model.id, "ticket key collision");
                    return Err(TicketingError::DuplicateTicketKey);
                }
                Err(e) => return Err(anyhow::Error::new(e).context("insert ticket").into()),
            }
        }

        txn.commit().await.context("commit checkout transaction")?;
        Ok((order_from_model(order_model), issued))
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, TicketingError> {
        let model = orders::Entity::find_by_id(i64::from(id))
            .one(self.db.as_ref())
            .await
            .context("find order by id")?;
        Ok(model.map(order_from_model))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, TicketingError> {
        let models = orders::Entity::find()
            .filter(orders::Column::UserId.eq(i64::from(user_id)))
            .order_by_desc(orders::Column::Id)
            .all(self.db.as_ref())
            .await
            .context("list orders by user")?;
        Ok(models.into_iter().map(order_from_model).collect())
    }

    async fn delete(&self, id: OrderId) -> Result<bool, TicketingError> {
        let result = orders::Entity::delete_by_id(i64::from(id))
            .exec(self.db.as_ref())
            .await
            .context("delete order")?;
        Ok(result.rows_affected > 0)
    }
}

async fn insert_ticket(
    txn: &DatabaseTransaction,
    order_id: i64,
    ticket: &NewTicket,
) -> Result<tickets::Model, DbErr> {
    tickets::ActiveModel {
        order_id: Set(order_id),
        offer_id: Set(i64::from(ticket.offer_id)),
        final_key: Set(ticket.final_key.clone()),
        consumed_at: Set(None),
        ..Default::default()
    }
    .insert(txn)
    .await
}

fn order_from_model(model: orders::Model) -> Order {
    Order {
        id: OrderId(model.id),
        user_id: UserId(model.user_id),
        purchase_key: model.purchase_key,
        created_at: model.created_at,
    }
}

// ── Ticket repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTicketRepository {
    pub db: Arc<DatabaseConnection>,
}

impl TicketRepository for DbTicketRepository {
    async fn find_by_key(&self, final_key: &str) -> Result<Option<Ticket>, TicketingError> {
        let model = tickets::Entity::find()
            .filter(tickets::Column::FinalKey.eq(final_key))
            .one(self.db.as_ref())
            .await
            .context("find ticket by key")?;
        Ok(model.map(ticket_from_model))
    }

    async fn find_by_id(&self, id: TicketId) -> Result<Option<Ticket>, TicketingError> {
        let model = tickets::Entity::find_by_id(i64::from(id))
            .one(self.db.as_ref())
            .await
            .context("find ticket by id")?;
        Ok(model.map(ticket_from_model))
    }

    async fn list_by_order(&self, order_id: OrderId) -> Result<Vec<Ticket>, TicketingError> {
        let models = tickets::Entity::find()
            .filter(tickets::Column::OrderId.eq(i64::from(order_id)))
            .order_by_asc(tickets::Column::Id)
            .all(self.db.as_ref())
            .await
            .context("list tickets by order")?;
        Ok(models.into_iter().map(ticket_from_model).collect())
    }

    async fn consume_once(
        &self,
        final_key: &str,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, TicketingError> {
        // The row count of this single conditional update is the only arbiter.
        let result = tickets::Entity::update_many()
            .col_expr(tickets::Column::ConsumedAt, Expr::value(now))
            .filter(tickets::Column::FinalKey.eq(final_key))
            .filter(tickets::Column::ConsumedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .context("consume ticket")?;

        let current = self.find_by_key(final_key).await?;
        Ok(match (result.rows_affected, current) {
            (1, Some(ticket)) => ConsumeOutcome::Consumed(ticket),
            (_, Some(ticket)) => ConsumeOutcome::AlreadyConsumed(ticket),
            (_, None) => ConsumeOutcome::NotFound,
        })
    }
}

fn ticket_from_model(model: tickets::Model) -> Ticket {
    Ticket {
        id: TicketId(model.id),
        order_id: OrderId(model.order_id),
        offer_id: OfferId(model.offer_id),
        final_key: model.final_key,
        consumed_at: model.consumed_at,
    }
}
