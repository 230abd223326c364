//! Per-shop order lifecycle.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    WaitingPayment,
    WaitingSeller,
    Processed,
    OnDelivery,
    Delivered,
    Completed,
    Cancelled,
    RefundRequested,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Pay,
    Accept,
    Ship,
    Receive,
    Complete,
    Cancel,
    Reject,
    RequestRefund,
    AcceptRefund,
    RejectRefund,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::WaitingPayment,
        OrderStatus::WaitingSeller,
        OrderStatus::Processed,
        OrderStatus::OnDelivery,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::RefundRequested,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::WaitingPayment => "waiting_payment",
            OrderStatus::WaitingSeller => "waiting_seller",
            OrderStatus::Processed => "processed",
            OrderStatus::OnDelivery => "on_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::RefundRequested => "refund_requested",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }

    /// Next status for `action`, or `None` when the action is not allowed here.
    pub fn apply(self, action: OrderAction) -> Option<OrderStatus> {
        use OrderAction as A;
        use OrderStatus as S;
        match (self, action) {
            (S::WaitingPayment, A::Pay) => Some(S::WaitingSeller),
            (S::WaitingPayment, A::Cancel) => Some(S::Cancelled),
            (S::WaitingSeller, A::Cancel) => Some(S::Cancelled),
            (S::WaitingSeller, A::Reject) => Some(S::Cancelled),
            (S::WaitingSeller, A::Accept) => Some(S::Processed),
            (S::Processed, A::Ship) => Some(S::OnDelivery),
            (S::OnDelivery, A::Receive) => Some(S::Delivered),
            (S::Delivered, A::Complete) => Some(S::Completed),
            (S::Delivered, A::RequestRefund) => Some(S::RefundRequested),
            (S::RefundRequested, A::AcceptRefund) => Some(S::Refunded),
            (S::RefundRequested, A::RejectRefund) => Some(S::Completed),
            _ => None,
        }
    }

    /// Statuses in which the buyer has already paid for the shop invoice.
    pub fn is_paid(&self) -> bool {
        !matches!(self, OrderStatus::WaitingPayment | OrderStatus::Cancelled)
    }

    pub fn is_final(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_names() {
        for st in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(st.as_str()), Some(st));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn happy_path() {
        let mut st = OrderStatus::WaitingPayment;
        for action in [
            OrderAction::Pay,
            OrderAction::Accept,
            OrderAction::Ship,
            OrderAction::Receive,
            OrderAction::Complete,
        ] {
            st = st.apply(action).expect("allowed");
        }
        assert_eq!(st, OrderStatus::Completed);
        assert!(st.is_final());
    }

    #[test]
    fn cancel_only_before_processing() {
        assert_eq!(
            OrderStatus::WaitingSeller.apply(OrderAction::Cancel),
            Some(OrderStatus::Cancelled)
        );
        assert_eq!(OrderStatus::Processed.apply(OrderAction::Cancel), None);
        assert_eq!(OrderStatus::OnDelivery.apply(OrderAction::Reject), None);
    }

    #[test]
    fn refund_branch() {
        let st = OrderStatus::Delivered
            .apply(OrderAction::RequestRefund)
            .expect("allowed");
        assert_eq!(st, OrderStatus::RefundRequested);
        assert_eq!(st.apply(OrderAction::AcceptRefund), Some(OrderStatus::Refunded));
        assert_eq!(st.apply(OrderAction::RejectRefund), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::Completed.apply(OrderAction::RequestRefund), None);
    }

    #[test]
    fn paid_statuses() {
        assert!(!OrderStatus::WaitingPayment.is_paid());
        assert!(OrderStatus::WaitingSeller.is_paid());
        assert!(!OrderStatus::Cancelled.is_paid());
    }
}
