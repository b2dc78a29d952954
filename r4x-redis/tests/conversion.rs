use bytes::Bytes;
use pretty_assertions::assert_eq;
use r4x_core::RedisReply;
use r4x_redis::connector::{reply_from_error, reply_from_value};
use redis::{RedisError, Value, parse_redis_value};

#[test]
fn test_scalar_values() {
    assert_eq!(reply_from_value(Value::Nil), RedisReply::Nil);
    assert_eq!(reply_from_value(Value::Int(-7)), RedisReply::Integer(-7));
    assert_eq!(reply_from_value(Value::Okay), RedisReply::status("OK"));
    assert_eq!(
        reply_from_value(Value::SimpleString("PONG".to_owned())),
        RedisReply::status("PONG")
    );
    assert_eq!(
        reply_from_value(Value::BulkString(b"\x00binary".to_vec())),
        RedisReply::BulkString(Bytes::from_static(b"\x00binary"))
    );
}

#[test]
fn test_nested_arrays() {
    let value = Value::Array(vec![
        Value::Int(1),
        Value::Array(vec![Value::Nil, Value::BulkString(b"x".to_vec())]),
    ]);
    assert_eq!(
        reply_from_value(value),
        RedisReply::Array(vec![
            RedisReply::Integer(1),
            RedisReply::Array(vec![RedisReply::Nil, RedisReply::bulk("x")]),
        ])
    );
}

#[test]
fn test_resp3_values_fold_into_resp2_replies() {
    assert_eq!(reply_from_value(Value::Boolean(true)), RedisReply::Integer(1));
    assert_eq!(reply_from_value(Value::Double(1.5)), RedisReply::bulk("1.5"));
    assert_eq!(
        reply_from_value(Value::Map(vec![(
            Value::SimpleString("field".to_owned()),
            Value::Int(2)
        )])),
        RedisReply::Array(vec![RedisReply::status("field"), RedisReply::Integer(2)])
    );
}

#[test]
fn test_io_errors_are_transport_failures() {
    let err = RedisError::from(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "reset by peer",
    ));
    assert!(matches!(
        reply_from_error(err),
        Err(r4x_core::Error::Transport(_))
    ));
}

#[test]
fn test_server_errors_are_error_replies() {
    let err = parse_redis_value(b"-ERR unknown command 'FOO'\r\n")
        .unwrap()
        .extract_error()
        .unwrap_err();

    assert_eq!(
        reply_from_error(err).unwrap(),
        RedisReply::error("ERR unknown command 'FOO'")
    );
}

#[test]
fn test_wrongtype_keeps_its_code() {
    let err = parse_redis_value(
        b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n",
    )
    .unwrap()
    .extract_error()
    .unwrap_err();

    assert_eq!(
        reply_from_error(err).unwrap(),
        RedisReply::error("WRONGTYPE Operation against a key holding the wrong kind of value")
    );
}

#[test]
fn test_nested_server_error_is_error_reply() {
    let value = parse_redis_value(b"-NOSCRIPT No matching script\r\n").unwrap();
    assert_eq!(
        reply_from_value(Value::Array(vec![Value::Int(1), value])),
        RedisReply::Array(vec![
            RedisReply::Integer(1),
            RedisReply::error("NOSCRIPT No matching script"),
        ])
    );
}

#[test]
fn test_attribute_yields_its_data() {
    let value = Value::Attribute {
        data: Box::new(Value::Int(3)),
        attributes: vec![(Value::SimpleString("ttl".to_owned()), Value::Int(10))],
    };
    assert_eq!(reply_from_value(value), RedisReply::Integer(3));
}
