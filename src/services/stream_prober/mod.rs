//! Live stream probing
//!
//! Pulls an HTTP(S)-FLV stream, waits for the first AVC sequence header and
//! classifies the endpoint by the frame width in its SPS. A probe runs as one
//! spawned task bounded by a timeout and cancelled when the caller goes away.
//! Its result goes through a [`ResultGate`] so that only the first decoded
//! header is reported even though every tag passes through the tag handler.

use futures::StreamExt;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::codec::flv::AVC_VIDEO_PREAMBLE_LEN;
use crate::codec::{AvcDecoderConfigurationRecord, FlvTag, FlvTagReader, SequenceParameterSet};
use crate::models::Resolution;
use crate::services::resolution::classify_width;

pub mod errors;
pub mod gate;
pub mod puller;

pub use errors::ProbeError;
pub use gate::ResultGate;
pub use puller::{ChunkStream, FlvPuller, HttpFlvPuller};
#[cfg(test)]
pub use puller::MockFlvPuller;

/// What a successful probe learned about the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub resolution: Resolution,
    pub width: u32,
    pub height: u32,
    pub profile_idc: u8,
}

type ProbeGate = ResultGate<Result<ProbeOutcome, ProbeError>>;

/// How the spawned probe task stopped
enum TaskEnd {
    Finished,
    TimedOut,
    Cancelled,
}

#[derive(Clone)]
pub struct StreamProber {
    puller: Arc<dyn FlvPuller>,
}

impl StreamProber {
    pub fn new(puller: Arc<dyn FlvPuller>) -> Self {
        Self { puller }
    }

    /// Probe `url`, giving up after `timeout`
    ///
    /// Non-http(s) URLs fail with [`ProbeError::UnsupportedProtocol`] before
    /// any I/O. No retries are attempted.
    pub async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        let parsed = Url::parse(url).map_err(|e| ProbeError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProbeError::UnsupportedProtocol {
                scheme: parsed.scheme().to_string(),
            });
        }

        let (gate, receiver) = ResultGate::new();
        let token = CancellationToken::new();
        let task_token = token.clone();
        let puller = self.puller.clone();
        let task_url = parsed.clone();

        debug!("Probing {} (timeout {:?})", url, timeout);
        // The task owns its deadline; the guard stops it if this future is dropped
        let _guard = token.drop_guard();
        let handle = tokio::spawn(async move {
            let pull = pull_until_sequence_header(puller, task_url, gate);
            tokio::select! {
                _ = task_token.cancelled() => TaskEnd::Cancelled,
                bounded = tokio::time::timeout(timeout, pull) => match bounded {
                    Ok(()) => TaskEnd::Finished,
                    Err(_) => TaskEnd::TimedOut,
                },
            }
        });

        let result = match receiver.await {
            Ok(result) => result,
            // The task dropped the gate without publishing; its exit says why
            Err(_) => match handle.await {
                Ok(TaskEnd::TimedOut) => Err(ProbeError::Timeout { after: timeout }),
                Err(join_error) if join_error.is_panic() => Err(ProbeError::Panicked {
                    message: panic_message(join_error.into_panic()),
                }),
                _ => Err(ProbeError::Connection {
                    url: url.to_string(),
                    message: "stream ended before an AVC sequence header".to_string(),
                }),
            },
        };

        match &result {
            Ok(outcome) => debug!(
                "Probed {}: {}x{} -> {}",
                url, outcome.width, outcome.height, outcome.resolution
            ),
            Err(e) => warn!("Probe of {} failed: {}", url, e),
        }
        result
    }
}

/// Feed the pulled bytes through the tag reader until the gate has fired.
/// Every complete tag of a chunk is handed to [`on_tag`].
async fn pull_until_sequence_header(puller: Arc<dyn FlvPuller>, url: Url, gate: ProbeGate) {
    let mut chunks = match puller.pull(&url).await {
        Ok(chunks) => chunks,
        Err(e) => {
            gate.fire(Err(e));
            return;
        }
    };

    let mut reader = FlvTagReader::new();
    while let Some(chunk) = chunks.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                gate.fire(Err(e));
                return;
            }
        };
        reader.push(&chunk);

        loop {
            match reader.next_tag() {
                Ok(Some(tag)) => on_tag(&tag, &gate),
                Ok(None) => break,
                Err(e) => {
                    gate.fire(Err(e.into()));
                    return;
                }
            }
        }

        if gate.is_fired() {
            return;
        }
    }
}

fn on_tag(tag: &FlvTag, gate: &ProbeGate) {
    if tag.is_avc_sequence_header() && !gate.is_fired() {
        gate.fire(decode_sequence_header(tag));
    }
}

fn decode_sequence_header(tag: &FlvTag) -> Result<ProbeOutcome, ProbeError> {
    if tag.data.len() < AVC_VIDEO_PREAMBLE_LEN {
        return Err(ProbeError::ShortSequenceHeader {
            len: tag.data.len(),
        });
    }

    let record = AvcDecoderConfigurationRecord::parse(tag.data.slice(AVC_VIDEO_PREAMBLE_LEN..))?;
    let sps = record
        .sps
        .first()
        .filter(|sps| !sps.is_empty())
        .ok_or(ProbeError::EmptySps)?;
    let sps = SequenceParameterSet::parse(sps)?;

    Ok(ProbeOutcome {
        resolution: classify_width(sps.width),
        width: sps.width,
        height: sps.height,
        profile_idc: sps.profile_idc,
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::test_support::{
        SPS_1280X720, SPS_1920X1080_HIGH, SPS_3840X2160, SPS_720X576, SpsBuilder,
        avc_sequence_header, configuration_record, flv_header, flv_stream, flv_tag,
    };
    use crate::codec::{FlvError, SpsError};
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed body split into chunks of `chunk_size`
    struct StaticPuller {
        body: Vec<u8>,
        chunk_size: usize,
        pulls: AtomicUsize,
    }

    impl StaticPuller {
        fn new(body: Vec<u8>) -> Self {
            Self::chunked(body, 7)
        }

        fn chunked(body: Vec<u8>, chunk_size: usize) -> Self {
            Self {
                body,
                chunk_size,
                pulls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FlvPuller for StaticPuller {
        async fn pull(&self, _url: &Url) -> Result<ChunkStream, ProbeError> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            let chunks: Vec<Result<Bytes, ProbeError>> = self
                .body
                .chunks(self.chunk_size)
                .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
                .collect();
            Ok(stream::iter(chunks).boxed())
        }
    }

    /// Connects and then never sends a byte
    struct SilentPuller;

    #[async_trait]
    impl FlvPuller for SilentPuller {
        async fn pull(&self, _url: &Url) -> Result<ChunkStream, ProbeError> {
            Ok(stream::pending().boxed())
        }
    }

    /// Sends the FLV header and then an audio tag every 10ms, forever
    struct AudioOnlyPuller {
        chunks: Arc<AtomicUsize>,
    }

    impl AudioOnlyPuller {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let chunks = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    chunks: chunks.clone(),
                },
                chunks,
            )
        }
    }

    #[async_trait]
    impl FlvPuller for AudioOnlyPuller {
        async fn pull(&self, _url: &Url) -> Result<ChunkStream, ProbeError> {
            let chunks = self.chunks.clone();
            let header = stream::once(async { Ok(Bytes::from(flv_header())) });
            let audio = stream::unfold(0u32, move |timestamp| {
                let chunks = chunks.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    chunks.fetch_add(1, Ordering::SeqCst);
                    let tag = flv_tag(8, timestamp, &[0xaf, 0x01, 0x21, 0x00]);
                    Some((Ok(Bytes::from(tag)), timestamp + 10))
                }
            });
            Ok(header.chain(audio).boxed())
        }
    }

    struct PanickingPuller;

    #[async_trait]
    impl FlvPuller for PanickingPuller {
        async fn pull(&self, _url: &Url) -> Result<ChunkStream, ProbeError> {
            panic!("decoder exploded");
        }
    }

    fn prober(puller: impl FlvPuller + 'static) -> StreamProber {
        StreamProber::new(Arc::new(puller))
    }

    const URL: &str = "http://cdn.example.com/live/room.flv";
    const TIMEOUT: Duration = Duration::from_secs(5);

    #[rstest]
    #[case::sd(SPS_720X576, Resolution::Sd, 720)]
    #[case::wide_720p(SPS_1280X720, Resolution::Uhd, 1280)]
    #[case::full_hd_high_profile(SPS_1920X1080_HIGH, Resolution::Uhd, 1920)]
    #[case::uhd(SPS_3840X2160, Resolution::Uhd, 3840)]
    #[tokio::test]
    async fn classifies_by_sps_width(
        #[case] sps: &'static [u8],
        #[case] expected: Resolution,
        #[case] width: u32,
    ) {
        let outcome = prober(StaticPuller::new(flv_stream(sps)))
            .probe(URL, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome.resolution, expected);
        assert_eq!(outcome.width, width);
    }

    #[rstest]
    #[case(720, Resolution::Sd)]
    #[case(721, Resolution::Hd)]
    #[case(1080, Resolution::Hd)]
    #[case(1081, Resolution::Uhd)]
    #[tokio::test]
    async fn width_boundaries(#[case] width: u32, #[case] expected: Resolution) {
        let sps = SpsBuilder::high(width, 480).chroma_format(0).build();
        let outcome = prober(StaticPuller::new(flv_stream(&sps)))
            .probe(URL, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome.width, width);
        assert_eq!(outcome.resolution, expected);
    }

    #[tokio::test]
    async fn non_http_scheme_fails_without_io() {
        let puller = Arc::new(StaticPuller::new(flv_stream(SPS_1280X720)));
        let prober = StreamProber::new(puller.clone());

        let err = prober
            .probe("rtmp://cdn.example.com/live/room", TIMEOUT)
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::UnsupportedProtocol { ref scheme } if scheme == "rtmp"));
        assert!(err.is_caller_error());
        assert_eq!(puller.pulls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unparseable_url_is_invalid() {
        let err = prober(SilentPuller).probe("not a url", TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn first_of_many_sequence_headers_wins() {
        let mut body = flv_header();
        for (index, sps) in [SPS_720X576, SPS_3840X2160, SPS_1280X720].into_iter().enumerate() {
            let record = configuration_record(&[sps], &[]);
            body.extend(flv_tag(9, index as u32, &avc_sequence_header(&record)));
        }

        // One chunk: every header is seen by the tag handler, only the first is published
        let outcome = prober(StaticPuller::chunked(body.clone(), body.len()))
            .probe(URL, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(outcome.resolution, Resolution::Sd);
        assert_eq!(outcome.width, 720);
    }

    #[tokio::test]
    async fn silent_stream_times_out() {
        let err = prober(SilentPuller)
            .probe(URL, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { after } if after == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn panic_in_task_is_reported() {
        let err = prober(PanickingPuller).probe(URL, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ProbeError::Panicked { ref message } if message == "decoder exploded"));
    }

    #[tokio::test]
    async fn endless_stream_without_video_stops_at_the_timeout() {
        let (puller, chunks) = AudioOnlyPuller::new();

        let err = prober(puller)
            .probe(URL, Duration::from_millis(150))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));

        let at_timeout = chunks.load(Ordering::SeqCst);
        assert!(at_timeout > 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(chunks.load(Ordering::SeqCst), at_timeout);
    }

    #[tokio::test]
    async fn dropping_the_caller_stops_the_task() {
        let (puller, chunks) = AudioOnlyPuller::new();
        let prober = prober(puller);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(100),
            prober.probe(URL, Duration::from_secs(2)),
        )
        .await;
        assert!(abandoned.is_err());

        let at_drop = chunks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(300)).await;
        // At most the chunk already in flight when the caller went away
        assert!(chunks.load(Ordering::SeqCst) <= at_drop + 1);
    }

    #[tokio::test]
    async fn stream_without_sequence_header_is_a_connection_error() {
        let mut body = flv_header();
        body.extend(flv_tag(8, 0, &[0xaf, 0x00, 0x12, 0x10]));
        let err = prober(StaticPuller::new(body)).probe(URL, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ProbeError::Connection { .. }));
    }

    #[tokio::test]
    async fn short_sequence_header_is_reported() {
        let mut body = flv_header();
        body.extend(flv_tag(9, 0, &[0x17, 0x00, 0x00]));
        let err = prober(StaticPuller::new(body)).probe(URL, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ProbeError::ShortSequenceHeader { len: 3 }));
    }

    #[tokio::test]
    async fn record_without_sps_is_reported() {
        let mut body = flv_header();
        body.extend(flv_tag(9, 0, &avc_sequence_header(&configuration_record(&[], &[]))));
        let err = prober(StaticPuller::new(body)).probe(URL, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ProbeError::EmptySps));
    }

    #[tokio::test]
    async fn truncated_record_is_reported() {
        let mut record = configuration_record(&[SPS_1280X720], &[]);
        record.truncate(8);
        let mut body = flv_header();
        body.extend(flv_tag(9, 0, &avc_sequence_header(&record)));
        let err = prober(StaticPuller::new(body)).probe(URL, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ProbeError::ConfigurationRecord(_)));
    }

    #[tokio::test]
    async fn garbage_sps_is_reported() {
        let mut body = flv_header();
        let record = configuration_record(&[&[0x68, 0xce, 0x38, 0x80]], &[]);
        body.extend(flv_tag(9, 0, &avc_sequence_header(&record)));
        let err = prober(StaticPuller::new(body)).probe(URL, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ProbeError::Sps(SpsError::NotSps(8))));
    }

    #[tokio::test]
    async fn non_flv_body_is_a_container_error() {
        let body = b"<html>not a stream</html>".to_vec();
        let err = prober(StaticPuller::new(body)).probe(URL, TIMEOUT).await.unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Container(FlvError::InvalidSignature { .. })
        ));
    }
}
