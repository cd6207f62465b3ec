//! tagwire 集成测试
//!
//! 测试各个 crate 通过统一入口协同工作。

// 配置系统集成测试
#[cfg(test)]
mod config_tests {
    use std::env;
    use std::sync::Mutex;
    use tagwire::prelude::*;

    // 环境变量为进程级共享状态
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_default_and_validation() {
        let config = TagwireConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.client.port, 4700);
    }

    #[test]
    fn test_config_env_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe { env::set_var("TAGWIRE_MAX_FRAME_SIZE", "2048") };
        let config = TagwireConfig::default().load_with_env_override().unwrap();
        unsafe { env::remove_var("TAGWIRE_MAX_FRAME_SIZE") };
        assert_eq!(config.codec.max_frame_size, 2048);
        assert_eq!(DelimitedCodec::from_config(&config.codec).max_frame_size(), 2048);
    }

    #[test]
    fn test_config_drives_decode_limit() {
        let config = TagwireConfig::from_toml_str("[codec]\nrecursion_limit = 1\n").unwrap();
        let options = DecodeOptions::from(&config.codec);

        let node = MessageType::declare("Node");
        let mut builder = SchemaBuilder::for_type(&node);
        builder.optional("next", &node, 1).unwrap();
        builder.build().unwrap();

        let inner = Message::new(&node).with("next", Message::new(&node)).unwrap();
        let outer = Message::new(&node).with("next", inner).unwrap();
        let bytes = encode(&outer).unwrap();
        assert!(tagwire::tagwire_codec::decode_with(&node, bytes, &options).is_err());
    }
}

// 编解码集成测试
#[cfg(test)]
mod codec_tests {
    use tagwire::prelude::*;
    use tagwire::{BytesMut, TypeRegistry};
    use tokio_util::codec::{Decoder, Encoder};

    fn registry() -> (TypeRegistry, MessageType) {
        let level = EnumType::new("Level", [("LOW", 0), ("HIGH", 1)]).unwrap();
        let mut builder = SchemaBuilder::new("Alert");
        builder
            .required("text", ScalarKind::String, 1)
            .unwrap()
            .declare_field(
                Rule::Optional,
                "level",
                &level,
                2,
                FieldOptions::new().with_default(0),
            )
            .unwrap();
        let alert = builder.build().unwrap();

        let mut registry = TypeRegistry::new();
        registry.register_enum(&level).unwrap();
        registry.register_message(&alert).unwrap();
        (registry, alert)
    }

    #[test]
    fn test_registry_lookup_and_round_trip() {
        let (registry, alert) = registry();
        let resolved = registry.message("Alert").unwrap();
        assert_eq!(resolved, &alert);

        let msg = Message::new(resolved).with("text", "disk full").unwrap();
        let decoded = decode(&alert, encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded.get("level"), Some(&Value::Enum(0)));
        assert_eq!(decoded.to_string(), r#"<Alert text: "disk full", level: LOW(0)>"#);
    }

    #[test]
    fn test_stream_codec_with_messages() {
        let (_, alert) = registry();
        let mut codec = DelimitedCodec::new();
        let mut buf = BytesMut::new();
        for text in ["a", "b"] {
            let msg = Message::new(&alert).with("text", text).unwrap();
            codec.encode(encode(&msg).unwrap(), &mut buf).unwrap();
        }

        // 与 write_delimited 的输出完全一致
        let mut expected = BytesMut::new();
        for text in ["a", "b"] {
            let msg = Message::new(&alert).with("text", text).unwrap();
            expected.extend_from_slice(&write_delimited(&msg).unwrap());
        }
        assert_eq!(buf, expected);

        let mut texts = Vec::new();
        while let Some(frame) = codec.decode(&mut buf).unwrap() {
            let msg = decode(&alert, frame).unwrap();
            texts.push(msg.get("text").and_then(Value::as_str).unwrap().to_string());
        }
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_error_conversion() {
        let (_, alert) = registry();
        let err: tagwire::Error = encode(&Message::new(&alert)).unwrap_err().into();
        assert!(matches!(err, tagwire::Error::Codec(_)));
    }
}

// 客户端集成测试
#[cfg(all(test, feature = "client"))]
mod client_tests {
    use tagwire::prelude::*;

    #[tokio::test]
    async fn test_client_error_conversion() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result: tagwire::Result<RpcClient> =
            RpcClient::connect(addr).await.map_err(Into::into);
        assert!(matches!(result, Err(tagwire::Error::Client(_))));
    }

    #[test]
    fn test_client_config_from_loaded() {
        let loaded = TagwireConfig::default();
        let config = ClientConfig::from(&loaded);
        assert_eq!(config.server_addr, loaded.client.addr());
    }
}
