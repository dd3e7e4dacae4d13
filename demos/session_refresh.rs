//! Demonstrates a gateway riding through an expired session: the first call is answered with
//! `401`, the gateway refreshes the session cookie once, and the call is replayed transparently.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde::Deserialize;
use url::Url;
// self
use session_gateway::{config::GatewayConfig, gateway::ReqwestGateway, session::SessionEvent};

#[derive(Debug, Deserialize)]
struct Contract {
	id: u32,
	employee: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let expired = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/contracts").header("cookie", "session=expired");
			then.status(401).body("{\"message\":\"Session expired\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(204).header("set-cookie", "session=renewed; Path=/; HttpOnly");
		})
		.await;
	let renewed = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/contracts").header("cookie", "session=renewed");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":41,\"employee\":\"Grace Hopper\"}]");
		})
		.await;
	let config = GatewayConfig::builder()
		.base_url(Url::parse(&server.url("/api"))?)
		.default_header("accept", "application/json")
		.build()?;
	let gateway = ReqwestGateway::new(config)?;

	gateway
		.transport
		.cookie_jar()
		.add_cookie_str("session=expired; Path=/", &Url::parse(&server.url("/api/"))?);

	let mut events = gateway.session().subscribe();
	let contracts = gateway.get_json::<Vec<Contract>>("contracts").await?;

	for contract in &contracts {
		println!("Contract {} belongs to {}.", contract.id, contract.employee);
	}
	if let Ok(SessionEvent::Renewed { at }) = events.try_recv() {
		println!("Session renewed at {at}.");
	}

	expired.assert_async().await;
	refresh.assert_async().await;
	renewed.assert_async().await;

	Ok(())
}
