//! tagwire 性能基准测试
//!
//! 测试线路格式、编解码与分帧的性能指标。
//!
//! ```bash
//! cargo bench --features benchmark
//! ```

use bytes::BytesMut;
use tagwire::prelude::*;
use tagwire::tagwire_codec::wire::{WireReader, WireWriter};
use tokio_util::codec::{Decoder, Encoder};

/// 基准测试辅助宏
macro_rules! bench {
    ($name:expr, $code:block) => {
        let start = std::time::Instant::now();
        let iterations = 10000;
        for _ in 0..iterations {
            $code
        }
        let duration = start.elapsed();
        let avg_ns = duration.as_nanos() / iterations as u128;
        println!(
            "  {:30}: {:>8} ns/op ({} ops in {:?})",
            $name, avg_ns, iterations, duration
        );
    };
}

fn main() -> Result<()> {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   tagwire 性能基准测试");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    bench_wire_primitives()?;
    bench_message_encoding()?;
    bench_framing()?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   基准测试完成");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    Ok(())
}

/// 测试 varint 与定长值读写性能
fn bench_wire_primitives() -> Result<()> {
    println!("\n📊 线路格式基准测试:");

    bench!("append_varint(u64::MAX)", {
        let mut writer = WireWriter::with_capacity(16);
        writer.append_varint(u64::MAX);
    });

    let mut writer = WireWriter::new();
    writer.append_varint(u64::MAX);
    writer.append_fixed64(42);
    let data = writer.into_bytes();

    bench!("read_varint + read_fixed64", {
        let mut reader = WireReader::new(data.clone());
        let _ = reader.read_varint();
        let _ = reader.read_fixed64();
    });
    Ok(())
}

fn sample_types() -> Result<(MessageType, MessageType)> {
    let mut item = SchemaBuilder::new("Item");
    item.required("sku", ScalarKind::String, 1)?
        .optional("price", ScalarKind::Double, 2)?;
    let item = item.build()?;

    let mut order = SchemaBuilder::new("Order");
    order
        .required("id", ScalarKind::UInt64, 1)?
        .repeated("items", &item, 2)?
        .declare_field(
            Rule::Repeated,
            "quantities",
            ScalarKind::UInt32,
            3,
            FieldOptions::new().packed(),
        )?;
    Ok((order.build()?, item))
}

fn sample_order(order: &MessageType, item: &MessageType) -> Result<Message> {
    let mut msg = Message::new(order).with("id", 1001u64)?;
    for i in 0..8 {
        msg.push(
            "items",
            Message::new(item)
                .with("sku", format!("SKU-{}", i))?
                .with("price", 9.99f64)?,
        )?;
        msg.push("quantities", i as u32 * 100)?;
    }
    Ok(msg)
}

/// 测试消息编解码性能
fn bench_message_encoding() -> Result<()> {
    println!("\n📊 消息编解码基准测试:");

    let (order, item) = sample_types()?;
    let msg = sample_order(&order, &item)?;

    bench!("encode", {
        let _encoded = encode(&msg);
    });

    let encoded = encode(&msg)?;
    println!("  {:30}: {:>8} bytes", "encoded size", encoded.len());

    bench!("decode", {
        let _decoded = decode(&order, encoded.clone());
    });
    Ok(())
}

/// 测试分帧性能
fn bench_framing() -> Result<()> {
    println!("\n📊 分帧基准测试:");

    let (order, item) = sample_types()?;
    let body = encode(&sample_order(&order, &item)?)?;
    let mut codec = DelimitedCodec::new();

    bench!("DelimitedCodec encode + decode", {
        let mut buf = BytesMut::new();
        let _ = codec.encode(body.clone(), &mut buf);
        let _ = codec.decode(&mut buf);
    });

    let frame = write_delimited(&sample_order(&order, &item)?)?;
    bench!("read_delimited", {
        let mut input = frame.clone();
        let _ = read_delimited(&order, &mut input);
    });
    Ok(())
}
