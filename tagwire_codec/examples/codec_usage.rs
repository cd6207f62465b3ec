//! tagwire 编解码演示
//!
//! 展示如何声明 Schema、构造消息、编码、分帧以及解码：
//! - 普通字段、枚举字段与 packed 重复字段
//! - 自引用消息的前置声明
//! - 长度前缀分帧的连续读取
//!
//! ## 运行方式
//!
//! ```bash
//! cargo run -p tagwire_codec --example codec_usage
//! ```

use bytes::BytesMut;
use tagwire_codec::delimited::write_delimited_to;
use tagwire_codec::prelude::*;

fn main() -> Result<()> {
    println!("=== tagwire 编解码演示 ===\n");

    // 1. 声明类型
    let kind = EnumType::new("PhoneKind", [("MOBILE", 0), ("HOME", 1), ("WORK", 2)])?;

    let mut phone = SchemaBuilder::new("Phone");
    phone
        .required("number", ScalarKind::String, 1)?
        .declare_field(
            Rule::Optional,
            "kind",
            &kind,
            2,
            FieldOptions::new().with_default(1),
        )?;
    let phone = phone.build()?;

    let person = MessageType::declare("Person");
    let mut builder = SchemaBuilder::for_type(&person);
    builder
        .required("name", ScalarKind::String, 1)?
        .optional("age", ScalarKind::UInt32, 2)?
        .repeated("phones", &phone, 3)?
        .declare_field(
            Rule::Repeated,
            "lucky_numbers",
            ScalarKind::SInt32,
            4,
            FieldOptions::new().packed(),
        )?
        .optional("best_friend", &person, 5)?;
    builder.build()?;

    println!("{}\n", person.schema()?);

    // 2. 构造消息
    let friend = Message::new(&person).with("name", "Grace")?;
    let ada = Message::new(&person)
        .with("name", "Ada")?
        .with("age", 36u32)?
        .with_repeated(
            "phones",
            [
                Message::new(&phone)
                    .with("number", "555-0100")?
                    .with("kind", 0)?,
                Message::new(&phone)
                    .with("number", "555-0199")?
                    .with("kind", 2)?,
            ],
        )?
        .with_repeated("lucky_numbers", [7, -3, 42])?
        .with("best_friend", friend)?;
    println!("消息: {}", ada);

    // 3. 编码与解码
    let bytes = encode(&ada)?;
    println!("编码: {} 字节 {:02X?}", bytes.len(), bytes.as_ref());

    let decoded = decode(&person, bytes)?;
    println!("解码: {}", decoded);
    println!("往返一致: {}\n", decoded == ada);

    // 4. 分帧
    let mut stream = BytesMut::new();
    write_delimited_to(&ada, &mut stream)?;
    write_delimited_to(&Message::new(&person).with("name", "Linus")?, &mut stream)?;

    let mut input = stream.freeze();
    while let Some(msg) = read_delimited(&person, &mut input)? {
        println!("读取帧: {}", msg);
    }

    println!("\n=== 演示完成 ===");
    Ok(())
}
