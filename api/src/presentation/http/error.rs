use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::application::use_cases::addresses::AddressError;
use crate::application::use_cases::auth::AuthError;
use crate::application::use_cases::carts::CartError;
use crate::application::use_cases::chats::ChatError;
use crate::application::use_cases::marketplace::MarketplaceError;
use crate::application::use_cases::orders::OrderError;
use crate::application::use_cases::orders::checkout::CheckoutError;
use crate::application::use_cases::products::ProductError;
use crate::application::use_cases::shops::ShopError;
use crate::application::use_cases::users::UserError;
use crate::application::use_cases::wallets::WalletError;

/// Error half of the response envelope: `{code, message, data: null}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::bad_request("INVALID_INPUT", message)
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "authentication required")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// Logs the cause; clients only see a generic message.
    pub fn internal(err: anyhow::Error) -> Self {
        tracing::error!(error = ?err, "internal_error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "code": self.code,
            "message": self.message,
            "data": null,
        });
        (self.status, axum::Json(body)).into_response()
    }
}

/// `axum::Json` whose rejections use the envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request("INVALID_BODY", rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::internal(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let msg = err.to_string();
        match err {
            AuthError::InvalidCredentialFormat(_) => {
                ApiError::bad_request("INVALID_CREDENTIAL_FORMAT", msg)
            }
            AuthError::EmailTaken => ApiError::conflict("EMAIL_TAKEN", msg),
            AuthError::UsernameTaken => ApiError::conflict("USERNAME_TAKEN", msg),
            AuthError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", msg)
            }
            AuthError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let msg = err.to_string();
        match err {
            UserError::NotFound => ApiError::not_found("USER_NOT_FOUND", msg),
            UserError::InvalidCredentialFormat(_) => {
                ApiError::bad_request("INVALID_CREDENTIAL_FORMAT", msg)
            }
            UserError::WrongPassword => ApiError::bad_request("WRONG_PASSWORD", msg),
            UserError::InvalidInput(_) => ApiError::invalid_input(msg),
            UserError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<AddressError> for ApiError {
    fn from(err: AddressError) -> Self {
        let msg = err.to_string();
        match err {
            AddressError::NotFound => ApiError::not_found("ADDRESS_NOT_FOUND", msg),
            AddressError::LimitReached => ApiError::bad_request("ADDRESS_LIMIT_REACHED", msg),
            AddressError::InvalidLocation => ApiError::bad_request("INVALID_LOCATION", msg),
            AddressError::InUse => ApiError::conflict("ADDRESS_IN_USE", msg),
            AddressError::InvalidInput(_) => ApiError::invalid_input(msg),
            AddressError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        let msg = err.to_string();
        match err {
            WalletError::NotFound => ApiError::not_found("WALLET_NOT_FOUND", msg),
            WalletError::AlreadyActivated => ApiError::conflict("WALLET_ALREADY_EXISTS", msg),
            WalletError::InvalidPinFormat(_) => ApiError::bad_request("INVALID_PIN_FORMAT", msg),
            WalletError::WrongPin { .. } => ApiError::bad_request("WRONG_PIN", msg),
            WalletError::Locked => ApiError::new(StatusCode::LOCKED, "WALLET_LOCKED", msg),
            WalletError::InvalidAmount => ApiError::bad_request("INVALID_AMOUNT", msg),
            WalletError::BalanceLimitReached => ApiError::bad_request("BALANCE_LIMIT_REACHED", msg),
            WalletError::InsufficientBalance => {
                ApiError::bad_request("INSUFFICIENT_BALANCE", msg)
            }
            WalletError::InvoiceNotFound => ApiError::not_found("INVOICE_NOT_FOUND", msg),
            WalletError::NothingToPay => ApiError::conflict("NOTHING_TO_PAY", msg),
            WalletError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        let msg = err.to_string();
        match err {
            ShopError::NotFound => ApiError::not_found("SHOP_NOT_FOUND", msg),
            ShopError::AlreadyExists => ApiError::conflict("SHOP_ALREADY_EXISTS", msg),
            ShopError::NameTaken => ApiError::conflict("NAME_TAKEN", msg),
            ShopError::AddressNotFound => ApiError::not_found("ADDRESS_NOT_FOUND", msg),
            ShopError::CourierNotFound => ApiError::not_found("COURIER_NOT_FOUND", msg),
            ShopError::ProductNotFound => ApiError::not_found("PRODUCT_NOT_FOUND", msg),
            ShopError::VoucherNotFound => ApiError::not_found("VOUCHER_NOT_FOUND", msg),
            ShopError::CodeTaken => ApiError::conflict("CODE_TAKEN", msg),
            ShopError::InvalidInput(_) => ApiError::invalid_input(msg),
            ShopError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        let msg = err.to_string();
        match err {
            ProductError::ShopRequired => ApiError::new(StatusCode::FORBIDDEN, "SHOP_REQUIRED", msg),
            ProductError::NotFound => ApiError::not_found("PRODUCT_NOT_FOUND", msg),
            ProductError::SkuNotFound => ApiError::not_found("SKU_NOT_FOUND", msg),
            ProductError::CategoryNotFound => ApiError::not_found("CATEGORY_NOT_FOUND", msg),
            ProductError::InvalidInput(_) => ApiError::invalid_input(msg),
            ProductError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        let msg = err.to_string();
        match err {
            CartError::SkuNotFound => ApiError::not_found("SKU_NOT_FOUND", msg),
            CartError::ItemNotFound => ApiError::not_found("CART_ITEM_NOT_FOUND", msg),
            CartError::OwnProduct => ApiError::bad_request("OWN_PRODUCT", msg),
            CartError::InsufficientStock => ApiError::bad_request("INSUFFICIENT_STOCK", msg),
            CartError::InvalidQuantity => ApiError::bad_request("INVALID_QUANTITY", msg),
            CartError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let msg = err.to_string();
        match err {
            CheckoutError::InvalidRequest(_) => ApiError::bad_request("INVALID_REQUEST", msg),
            CheckoutError::AddressNotFound => ApiError::not_found("ADDRESS_NOT_FOUND", msg),
            CheckoutError::ShopNotFound => ApiError::not_found("SHOP_NOT_FOUND", msg),
            CheckoutError::CourierNotFound => ApiError::not_found("COURIER_NOT_FOUND", msg),
            CheckoutError::CartItemNotFound => ApiError::not_found("CART_ITEM_NOT_FOUND", msg),
            CheckoutError::QuantityMismatch => ApiError::bad_request("QUANTITY_MISMATCH", msg),
            CheckoutError::InsufficientStock => ApiError::bad_request("INSUFFICIENT_STOCK", msg),
            CheckoutError::InvalidVoucher => ApiError::bad_request("INVALID_VOUCHER", msg),
            CheckoutError::BelowMinimumSpend => {
                ApiError::bad_request("BELOW_MINIMUM_SPEND", msg)
            }
            CheckoutError::TotalMismatch { .. } => ApiError::bad_request("TOTAL_MISMATCH", msg),
            CheckoutError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let msg = err.to_string();
        match err {
            OrderError::NotFound => ApiError::not_found("ORDER_NOT_FOUND", msg),
            OrderError::ShopRequired => ApiError::new(StatusCode::FORBIDDEN, "SHOP_REQUIRED", msg),
            OrderError::Forbidden => ApiError::forbidden(msg),
            OrderError::InvalidStatus => ApiError::conflict("INVALID_STATUS", msg),
            OrderError::RefundNotFound => ApiError::not_found("REFUND_NOT_FOUND", msg),
            OrderError::AlreadyReviewed => ApiError::conflict("ALREADY_REVIEWED", msg),
            OrderError::InvalidInput(_) => ApiError::invalid_input(msg),
            OrderError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<MarketplaceError> for ApiError {
    fn from(err: MarketplaceError) -> Self {
        let msg = err.to_string();
        match err {
            MarketplaceError::CodeTaken => ApiError::conflict("CODE_TAKEN", msg),
            MarketplaceError::CategoryNotFound => ApiError::not_found("CATEGORY_NOT_FOUND", msg),
            MarketplaceError::InvalidInput(_) => ApiError::invalid_input(msg),
            MarketplaceError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let msg = err.to_string();
        match err {
            ChatError::ShopNotFound => ApiError::not_found("SHOP_NOT_FOUND", msg),
            ChatError::ShopRequired => ApiError::new(StatusCode::FORBIDDEN, "SHOP_REQUIRED", msg),
            ChatError::OwnShop => ApiError::bad_request("OWN_SHOP", msg),
            ChatError::InvalidMessage => ApiError::bad_request("INVALID_MESSAGE", msg),
            ChatError::Internal(e) => ApiError::internal(e),
        }
    }
}
