pub mod gateway;

pub use gateway::{CheckoutGateway, GatewayCheckoutOrder, GatewayError, RemoteGateway};
