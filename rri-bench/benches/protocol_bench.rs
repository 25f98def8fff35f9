//! Protocol encoding/decoding benchmarks.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rri_protocol::frame::Frame;
use rri_protocol::{
    censor_raw_message, parse_query, parse_response, Decoder, DenicHandle, DomainData, Encoder,
    Entity, Query, Response, ResponseFieldList, ResponseFieldName,
};

fn create_test_query(name_servers: usize) -> Query {
    let data = DomainData {
        holder_handles: vec![DenicHandle::new(1000011, "HOLDER")],
        general_request_handles: vec![DenicHandle::new(1000011, "GENERAL")],
        abuse_contact_handles: vec![DenicHandle::new(1000011, "ABUSE")],
        name_servers: (0..name_servers)
            .map(|i| format!("ns{}.denic.de", i))
            .collect(),
    };
    Query::update_domain("denic.de", &data)
}

fn create_test_response(entities: usize) -> Response {
    let mut response = Response::success();
    response.add_field(ResponseFieldName::Stid, "a1b2c3d4-e5f6-7890-abcd-ef1234567890");
    for i in 0..entities {
        let mut fields = ResponseFieldList::new();
        fields.push("handle", format!("DENIC-1000011-CONTACT{}", i));
        fields.push("name", "Max Mustermann");
        fields.push("address", "Kaiserstrasse 75-77");
        fields.push("postalcode", "60329");
        fields.push("city", "Frankfurt am Main");
        fields.push("countrycode", "DE");
        response.add_entity(Entity::new("Contact", fields));
    }
    response
}

fn bench_frame_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_encode");

    for size in [100, 1000, 10000] {
        let frame = Frame::new(Bytes::from("x".repeat(size)));

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &frame, |b, frame| {
            b.iter(|| black_box(frame.encode().unwrap()));
        });
    }

    group.finish();
}

fn bench_frame_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decode");

    for size in [100, 1000, 10000] {
        let encoded = Frame::new(Bytes::from("x".repeat(size))).encode().unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| {
                let mut buf = encoded.clone();
                black_box(Frame::decode(&mut buf).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_query_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_encode");

    for name_servers in [1, 10, 100] {
        let query = create_test_query(name_servers);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(name_servers),
            &query,
            |b, query| {
                b.iter(|| black_box(Encoder::encode_query(query).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_query_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_parse");

    for name_servers in [1, 10, 100] {
        let text = create_test_query(name_servers).encode_kv();

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(name_servers),
            &text,
            |b, text| {
                b.iter(|| black_box(parse_query(text).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_response_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_parse");

    for entities in [0, 10, 100] {
        let text = create_test_response(entities).encode_kv();

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entities), &text, |b, text| {
            b.iter(|| black_box(parse_response(text).unwrap()));
        });
    }

    group.finish();
}

fn bench_decoder_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder_stream");

    for count in [10, 100] {
        let mut stream = Vec::new();
        for _ in 0..count {
            stream.extend_from_slice(&Encoder::encode_query(&create_test_query(5)).unwrap());
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &stream, |b, stream| {
            b.iter(|| {
                let mut decoder = Decoder::new();
                decoder.extend(stream);
                let mut decoded = 0;
                while let Some(query) = decoder.decode_query().unwrap() {
                    black_box(query);
                    decoded += 1;
                }
                decoded
            });
        });
    }

    group.finish();
}

fn bench_censor(c: &mut Criterion) {
    let login = Query::login("DENIC-1000011-TEST", "secret").encode_kv();
    let update = create_test_query(10).encode_kv();

    let mut group = c.benchmark_group("censor_raw_message");
    group.bench_function("login", |b| {
        b.iter(|| black_box(censor_raw_message(&login)));
    });
    group.bench_function("no_password", |b| {
        b.iter(|| black_box(censor_raw_message(&update)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_frame_encode,
    bench_frame_decode,
    bench_query_encode,
    bench_query_parse,
    bench_response_parse,
    bench_decoder_stream,
    bench_censor,
);
criterion_main!(benches);
