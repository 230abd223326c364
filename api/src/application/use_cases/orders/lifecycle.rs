use uuid::Uuid;

use crate::application::ports::order_repository::{OrderRepository, RefundChange, Transition};
use crate::application::use_cases::orders::OrderError;
use crate::domain::orders::invoice::{RefundStatus, ShopOrder};
use crate::domain::orders::status::OrderAction;

/// Who is acting on a shop order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Buyer(Uuid),
    /// Owner of the shop, identified by the shop id.
    Seller(Uuid),
}

impl Actor {
    fn can_see(&self, order: &ShopOrder) -> bool {
        match self {
            Actor::Buyer(user_id) => order.buyer_id == *user_id,
            Actor::Seller(shop_id) => order.shop_id == *shop_id,
        }
    }

    fn may(&self, action: OrderAction) -> bool {
        use OrderAction as A;
        match self {
            Actor::Buyer(_) => matches!(
                action,
                A::Cancel | A::Receive | A::Complete | A::RequestRefund
            ),
            Actor::Seller(_) => matches!(
                action,
                A::Accept | A::Ship | A::Reject | A::AcceptRefund | A::RejectRefund
            ),
        }
    }
}

pub struct ApplyOrderAction<'a, R: OrderRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: OrderRepository + ?Sized> ApplyOrderAction<'a, R> {
    /// Moves a shop order through the status machine. `note` is stored on
    /// the status row; for a refund request it is the required reason.
    pub async fn execute(
        &self,
        actor: Actor,
        shop_order_id: Uuid,
        action: OrderAction,
        note: Option<String>,
    ) -> Result<ShopOrder, OrderError> {
        if action == OrderAction::Pay {
            // Paying goes through the wallet for the whole invoice
            return Err(OrderError::Forbidden);
        }
        let detail = self
            .repo
            .get_shop_order(shop_order_id)
            .await?
            .filter(|d| actor.can_see(&d.order))
            .ok_or(OrderError::NotFound)?;
        if !actor.may(action) {
            return Err(OrderError::Forbidden);
        }
        let order = detail.order;
        let to = order.status.apply(action).ok_or(OrderError::InvalidStatus)?;
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let mut transition = Transition::new(order.id, order.status, to);
        match action {
            OrderAction::Cancel | OrderAction::Reject => {
                transition.restock = true;
                if order.status.is_paid() {
                    transition.refund_buyer = Some(order.total);
                }
            }
            OrderAction::Complete => {
                transition.pay_seller = Some(order.total);
                transition.count_sold = true;
            }
            OrderAction::RequestRefund => {
                let reason = note.clone().ok_or_else(|| {
                    OrderError::InvalidInput("a refund reason is required".into())
                })?;
                transition.refund = Some(RefundChange::Open {
                    user_id: order.buyer_id,
                    reason,
                });
            }
            OrderAction::AcceptRefund => {
                transition.refund_buyer = Some(order.total);
                transition.refund = Some(RefundChange::Resolve(RefundStatus::Accepted));
            }
            OrderAction::RejectRefund => {
                transition.pay_seller = Some(order.total);
                transition.count_sold = true;
                transition.refund = Some(RefundChange::Resolve(RefundStatus::Rejected));
            }
            OrderAction::Accept | OrderAction::Ship | OrderAction::Receive | OrderAction::Pay => {}
        }
        transition.note = note;

        if !self.repo.transition(&transition).await? {
            // Someone else moved the order first
            return Err(OrderError::InvalidStatus);
        }
        tracing::info!(
            shop_order_id = %order.id,
            from = order.status.as_str(),
            to = to.as_str(),
            "shop_order_transition"
        );
        Ok(ShopOrder { status: to, ..order })
    }
}
