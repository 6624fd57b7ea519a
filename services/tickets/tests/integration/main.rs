
mod checkout_test;
mod offer_test;
mod order_test;
mod router_test;
