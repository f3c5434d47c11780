mod pricing;
mod status;

pub use pricing::{
    assemble_breakdown, calculate_order_pricing, OrderPricedItem, OrderPricingBreakdown,
    OrderPricingRequest,
};
pub use status::{order_status_patch, update_order_status, OrderStatusRequest, OrderStatusResponse};
