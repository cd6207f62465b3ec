//! RPC round trip in one process
//!
//! Starts a loopback server that answers `Greeter.Hello`, then calls it a few
//! times with `RpcClient`.
//!
//! ```bash
//! cargo run -p tagwire_client --example rpc_echo
//! ```

use futures::{SinkExt, StreamExt};
use tagwire_client::{ClientConfig, RpcClient};
use tagwire_codec::{
    DelimitedCodec, Message, MessageType, RpcHeader, ScalarKind, SchemaBuilder, Value, decode,
    encode, rpc_header_type,
};
use tagwire_config::TagwireConfig;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

fn greeting_types() -> tagwire_codec::Result<(MessageType, MessageType)> {
    let mut request = SchemaBuilder::new("HelloRequest");
    request.required("name", ScalarKind::String, 1)?;
    let mut reply = SchemaBuilder::new("HelloReply");
    reply.required("greeting", ScalarKind::String, 1)?;
    Ok((request.build()?, reply.build()?))
}

async fn serve(stream: TcpStream) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (request_type, reply_type) = greeting_types()?;
    let mut framed = Framed::new(stream, DelimitedCodec::new());

    while let Some(header) = framed.next().await {
        let header = RpcHeader::from_message(&decode(rpc_header_type(), header?)?)?;
        let Some(body) = framed.next().await else {
            break;
        };
        let request = decode(&request_type, body?)?;
        let name = request.get("name").and_then(Value::as_str).unwrap_or("stranger");

        let response = RpcHeader::request(header.service_method, header.seq);
        let reply = Message::new(&reply_type).with("greeting", format!("Hello, {}!", name))?;
        framed.feed(encode(&response.to_message()?)?).await?;
        framed.feed(encode(&reply)?).await?;
        framed.flush().await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            if let Err(e) = serve(stream).await {
                eprintln!("server error: {}", e);
            }
        }
    });

    let mut loaded = TagwireConfig::default().load_with_env_override()?;
    loaded.client.host = addr.ip().to_string();
    loaded.client.port = addr.port();
    println!("{}", loaded.summary());

    let (request_type, reply_type) = greeting_types()?;
    let mut client = RpcClient::connect_with_config(ClientConfig::from(&loaded)).await?;

    for name in ["Ada", "Grace", "Linus"] {
        let request = Message::new(&request_type).with("name", name)?;
        let reply = client.call("Greeter.Hello", &request, &reply_type).await?;
        println!("seq {} -> {}", client.next_seq() - 1, reply);
    }

    client.close().await?;
    Ok(())
}
