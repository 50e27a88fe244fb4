//! The peer connection state machine: owns every collaborator and drives
//! the `New → Checking → Connected` lifecycle, the handshake sub-phase
//! inside `Connected`, and the egress/ingress pipelines once DTLS-SRTP is
//! up. Every collaborator is an owned trait object, and [`PeerConnection::tick`]
//! is a single `match` over [`PeerConnectionState`] that advances at most
//! one step of whichever phase is current.

use std::time::Instant;

use bytes::Bytes;
use log::{debug, warn};

use crate::classifier::{self, Incoming};
use crate::collaborators::{
    DtlsEngine, DtlsEvent, DtlsState, IceAgent, RtpPacketizer, SctpEndpoint, SctpEvent, SrtpContext,
};
use crate::constants::{MAX_HANDSHAKE_POLL_ATTEMPTS, PPID_BINARY, PPID_STRING};
use crate::error::{Error, Result};
use crate::events::PeerConnectionHandler;
use crate::options::{AudioCodec, DataChannelMode, PeerOptions, VideoCodec};
use crate::packetizer::{H264Packetizer, PcmaPacketizer};
use crate::ring_buffer::RingBuffer;
use crate::rtcp;
use crate::rtp::RtpHeader;
use crate::sdp;
use crate::state::PeerConnectionState;

/// A single-peer WebRTC endpoint: negotiates a session, brings up a
/// DTLS-SRTP-secured transport over ICE, and shuttles RTP/RTCP and
/// data-channel traffic once connected. See the module docs for the
/// state machine this drives.
pub struct PeerConnection {
    options: PeerOptions,
    agent: Box<dyn IceAgent>,
    dtls: Box<dyn DtlsEngine>,
    sctp: Box<dyn SctpEndpoint>,
    handler: Box<dyn PeerConnectionHandler>,

    state: PeerConnectionState,
    offer_armed: bool,
    offer_created: bool,
    connected_fired: bool,
    sctp_opened: bool,

    sender_ssrc: u32,
    audio_queue: Option<RingBuffer>,
    video_queue: Option<RingBuffer>,
    data_queue: Option<RingBuffer>,
    audio_packetizer: Option<PcmaPacketizer>,
    video_packetizer: Option<H264Packetizer>,

    local_srtp: Option<Box<dyn SrtpContext>>,
    remote_srtp: Option<Box<dyn SrtpContext>>,

    handshake_attempts: u32,
}

impl PeerConnection {
    /// Validates `options`, allocates ring buffers and packetizers for
    /// whichever media are enabled, and takes ownership of every
    /// collaborator. The `IceAgent` must already be configured for the
    /// controlled role and the `DtlsEngine` for the server role; this core
    /// never flips either.
    pub fn new(
        options: PeerOptions,
        agent: Box<dyn IceAgent>,
        dtls: Box<dyn DtlsEngine>,
        sctp: Box<dyn SctpEndpoint>,
        handler: Box<dyn PeerConnectionHandler>,
    ) -> Result<Self> {
        options.validate()?;

        let audio_queue = (options.audio_codec != AudioCodec::None)
            .then(|| RingBuffer::new(options.ring_capacity));
        let video_queue = (options.video_codec != VideoCodec::None)
            .then(|| RingBuffer::new(options.ring_capacity));
        let data_queue =
            options.datachannel.is_enabled().then(|| RingBuffer::new(options.ring_capacity));

        let audio_packetizer = (options.audio_codec == AudioCodec::Pcma)
            .then(|| PcmaPacketizer::new(rand::random::<u32>()));
        let video_packetizer = (options.video_codec == VideoCodec::H264)
            .then(|| H264Packetizer::new(rand::random::<u32>()));

        Ok(PeerConnection {
            options,
            agent,
            dtls,
            sctp,
            handler,
            state: PeerConnectionState::New,
            offer_armed: false,
            offer_created: false,
            connected_fired: false,
            sctp_opened: false,
            sender_ssrc: rand::random::<u32>(),
            audio_queue,
            video_queue,
            data_queue,
            audio_packetizer,
            video_packetizer,
            local_srtp: None,
            remote_srtp: None,
            handshake_attempts: 0,
        })
    }

    pub fn state(&self) -> PeerConnectionState {
        self.state
    }

    /// Arms offer generation: the next `tick()` taken while in `New` builds
    /// and emits the local SDP. Calling this more than once before the
    /// offer actually fires is harmless.
    pub fn create_offer(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(Error::AlreadyClosed);
        }
        self.offer_armed = true;
        Ok(())
    }

    /// Applies a remote SDP (an answer, in this core's controlled-role
    /// model) and transitions to `Checking`.
    pub fn set_remote_description(&mut self, sdp_text: &str) -> Result<()> {
        if self.state.is_terminal() {
            return Err(Error::AlreadyClosed);
        }
        let remote = sdp::parse_remote(sdp_text)?;
        self.agent
            .set_remote_description(&remote.ice)
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.dtls.set_remote_fingerprint(remote.fingerprint);
        self.set_state(PeerConnectionState::Checking);
        Ok(())
    }

    pub fn send_audio(&mut self, bytes: Bytes) -> Result<()> {
        self.enqueue_media(bytes, true)
    }

    pub fn send_video(&mut self, bytes: Bytes) -> Result<()> {
        self.enqueue_media(bytes, false)
    }

    fn enqueue_media(&mut self, bytes: Bytes, is_audio: bool) -> Result<()> {
        if self.state.is_terminal() {
            return Err(Error::AlreadyClosed);
        }
        if !self.connected_fired {
            return Err(Error::NotConnected);
        }
        let queue = if is_audio {
            self.audio_queue.as_mut()
        } else {
            self.video_queue.as_mut()
        };
        queue.ok_or(Error::NotConnected)?.push_tail(bytes)
    }

    pub fn datachannel_send(&mut self, bytes: Bytes) -> Result<()> {
        if self.state.is_terminal() {
            return Err(Error::AlreadyClosed);
        }
        if !self.sctp_opened {
            return Err(Error::NotConnected);
        }
        self.data_queue
            .as_mut()
            .ok_or(Error::NotConnected)?
            .push_tail(bytes)
    }

    /// Builds and sends a Picture Loss Indication targeting `ssrc`.
    pub fn send_rtcp_pli(&mut self, ssrc: u32) -> Result<()> {
        if self.state.is_terminal() {
            return Err(Error::AlreadyClosed);
        }
        if !self.connected_fired {
            return Err(Error::NotConnected);
        }
        let pli = rtcp::build_pli(self.sender_ssrc, ssrc);
        let srtp = self.local_srtp.as_mut().ok_or(Error::NotConnected)?;
        let encrypted = srtp.encrypt_rtcp(&pli)?;
        self.agent.send(&encrypted)
    }

    /// Idempotent teardown. Transitions to `Closed` exactly once; a second
    /// call is a no-op that returns `Ok(())` and fires no further callback.
    pub fn close(&mut self) -> Result<()> {
        if self.state == PeerConnectionState::Closed {
            return Ok(());
        }
        self.set_state(PeerConnectionState::Closed);
        Ok(())
    }

    fn set_state(&mut self, new_state: PeerConnectionState) {
        if new_state == self.state {
            return;
        }
        self.state = new_state;
        self.handler.on_ice_connection_state_change(new_state);
    }

    /// Drives one tick of the state machine. At most one connectivity
    /// check, one outbound frame per media class, and one inbound datagram
    /// read happen per call.
    ///
    /// An unrecoverable error surfaced by a collaborator (the ICE agent,
    /// the DTLS engine, or the SCTP endpoint) never propagates out of this
    /// call: it transitions the peer to [`PeerConnectionState::Failed`],
    /// fires the state-change callback, and `tick` still returns `Ok(())`.
    /// Only construction-time errors (from [`Self::new`]) are returned
    /// directly to a caller.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        let result = match self.state {
            PeerConnectionState::New => self.tick_new(),
            PeerConnectionState::Checking => self.tick_checking(),
            PeerConnectionState::Connected => self.tick_connected(now),
            PeerConnectionState::Completed
            | PeerConnectionState::Failed
            | PeerConnectionState::Disconnected
            | PeerConnectionState::Closed => return Ok(()),
        };
        if let Err(e) = result {
            warn!("peer connection transport failure, transitioning to failed: {e}");
            self.set_state(PeerConnectionState::Failed);
        }
        Ok(())
    }

    fn tick_new(&mut self) -> Result<()> {
        if !self.offer_armed || self.offer_created {
            return Ok(());
        }
        self.agent.reset();
        self.dtls.reset_session();
        self.handshake_attempts = 0;
        self.agent.gather_candidates()?;

        let (ice_credentials, candidates) = self.agent.local_description();
        let fingerprint = self.dtls.local_fingerprint();
        let session_id = rand::random::<u64>();
        let local = sdp::build_offer(
            &self.options,
            session_id,
            &ice_credentials,
            &candidates,
            &fingerprint,
        );

        self.offer_created = true;
        self.handler.on_ice_candidate(&local.sdp_text);
        Ok(())
    }

    fn tick_checking(&mut self) -> Result<()> {
        self.agent.select_candidate_pair();
        let nominated = self
            .agent
            .connectivity_check()
            .map_err(|e| Error::IceFailed(e.to_string()))?;

        if let Some(datagram) = self.agent.recv()? {
            // pre-Connected traffic is STUN only; anything else this early
            // is dropped so a misbehaving or premature peer can't wedge
            // the handshake.
            if !matches!(classifier::classify(datagram), Incoming::Stun(_)) {
                debug!("dropped non-STUN datagram while still checking connectivity");
            }
        }

        if nominated {
            self.set_state(PeerConnectionState::Connected);
        }
        Ok(())
    }

    fn tick_connected(&mut self, _now: Instant) -> Result<()> {
        self.drain_dtls_transmit()?;

        match self.dtls.state() {
            DtlsState::Init => {
                self.handshake_attempts += 1;
                if self.handshake_attempts > MAX_HANDSHAKE_POLL_ATTEMPTS {
                    return Err(Error::HandshakeFailed(
                        "exceeded maximum handshake poll attempts".to_string(),
                    ));
                }
                self.dtls.step()?;
                self.drain_dtls_transmit()?;
                if let Some(datagram) = self.agent.recv()? {
                    self.dispatch_inbound(datagram)?;
                }
                if self.dtls.state() == DtlsState::Connected {
                    self.on_dtls_connected()?;
                }
            }
            DtlsState::Connected => {
                if !self.connected_fired {
                    self.on_dtls_connected()?;
                }
                self.run_egress()?;
                self.run_ingress()?;
            }
            DtlsState::Failed => {
                self.set_state(PeerConnectionState::Failed);
            }
        }
        Ok(())
    }

    fn on_dtls_connected(&mut self) -> Result<()> {
        if let Some((local, remote)) = self.dtls.take_srtp_contexts() {
            self.local_srtp = Some(local);
            self.remote_srtp = Some(remote);
        }
        if self.options.datachannel.is_enabled() && !self.sctp_opened {
            self.sctp.open()?;
            self.sctp_opened = true;
        }
        if !self.connected_fired {
            self.connected_fired = true;
            self.handler.on_connected();
        }
        Ok(())
    }

    fn drain_dtls_transmit(&mut self) -> Result<()> {
        while let Some(record) = self.dtls.poll_transmit() {
            self.agent.send(&record)?;
        }
        Ok(())
    }

    fn drain_sctp_transmit(&mut self) -> Result<()> {
        while let Some(packet) = self.sctp.poll_transmit() {
            self.dtls.send_application_data(&packet)?;
        }
        self.drain_dtls_transmit()
    }

    /// One outbound frame each from video, audio, then data, in that order,
    /// per tick — a round-robin fairness policy so no medium can starve the
    /// others under sustained load.
    fn run_egress(&mut self) -> Result<()> {
        if let Some(frame) = Self::pop_one(&mut self.video_queue) {
            self.send_media_frame(&frame, false)?;
        }
        if let Some(frame) = Self::pop_one(&mut self.audio_queue) {
            self.send_media_frame(&frame, true)?;
        }
        if let Some(frame) = Self::pop_one(&mut self.data_queue) {
            let ppid = match self.options.datachannel {
                DataChannelMode::Binary => PPID_BINARY,
                _ => PPID_STRING,
            };
            self.sctp.send_message(&frame, ppid)?;
            self.drain_sctp_transmit()?;
        }
        Ok(())
    }

    fn pop_one(queue: &mut Option<RingBuffer>) -> Option<Bytes> {
        let queue = queue.as_mut()?;
        let frame = queue.peek_head().cloned();
        if frame.is_some() {
            queue.pop_head();
        }
        frame
    }

    fn send_media_frame(&mut self, frame: &[u8], is_audio: bool) -> Result<()> {
        let packets = if is_audio {
            self.audio_packetizer
                .as_mut()
                .map(|p| p.packetize(frame))
                .unwrap_or_default()
        } else {
            self.video_packetizer
                .as_mut()
                .map(|p| p.packetize(frame))
                .unwrap_or_default()
        };
        let srtp = self.local_srtp.as_mut().ok_or(Error::NotConnected)?;
        for packet in packets {
            let encrypted = srtp.encrypt_rtp(&packet)?;
            self.agent.send(&encrypted)?;
        }
        Ok(())
    }

    /// One non-blocking receive, classified and dispatched.
    fn run_ingress(&mut self) -> Result<()> {
        if let Some(datagram) = self.agent.recv()? {
            self.dispatch_inbound(datagram)?;
        }
        Ok(())
    }

    fn dispatch_inbound(&mut self, datagram: Bytes) -> Result<()> {
        match classifier::classify(datagram) {
            Incoming::Rtcp(buf) => self.handle_inbound_rtcp(&buf),
            Incoming::Dtls(record) => self.handle_inbound_dtls(record),
            Incoming::Rtp(buf) => self.handle_inbound_rtp(&buf),
            Incoming::Stun(_) => Ok(()),
            Incoming::Drop => {
                debug!("dropped malformed inbound datagram");
                Ok(())
            }
        }
    }

    fn handle_inbound_rtcp(&mut self, buf: &[u8]) -> Result<()> {
        let Some(srtp) = self.remote_srtp.as_mut() else {
            return Ok(());
        };
        let decrypted = match srtp.decrypt_rtcp(buf) {
            Ok(d) => d,
            Err(e) => {
                warn!("dropping undecryptable rtcp packet: {e}");
                return Ok(());
            }
        };
        if let Some(loss) = rtcp::parse_receiver_report(&decrypted) {
            if loss.fraction_lost > 0 {
                self.handler
                    .on_receiver_packet_loss(loss.fraction_lost as f32 / 256.0, loss.cumulative_lost);
            }
        }
        Ok(())
    }

    fn handle_inbound_dtls(&mut self, record: Bytes) -> Result<()> {
        let event = match self.dtls.handle_incoming(record) {
            Ok(event) => event,
            Err(e) => {
                warn!("dropping unprocessable dtls record: {e}");
                return Ok(());
            }
        };
        match event {
            DtlsEvent::None => Ok(()),
            DtlsEvent::HandshakeComplete => self.on_dtls_connected(),
            DtlsEvent::ApplicationData(payload) => {
                let events = self.sctp.handle_incoming(&payload)?;
                for event in events {
                    match event {
                        SctpEvent::Open => self.handler.on_data_channel_open(),
                        SctpEvent::Message(m) => self.handler.on_data_channel_message(&m),
                        SctpEvent::Close => self.handler.on_data_channel_close(),
                    }
                }
                self.drain_sctp_transmit()
            }
        }
    }

    fn handle_inbound_rtp(&mut self, buf: &[u8]) -> Result<()> {
        if !RtpHeader::validate(buf) {
            debug!("dropped rtp packet failing header validation");
            return Ok(());
        }
        let Some(srtp) = self.remote_srtp.as_mut() else {
            return Ok(());
        };
        let payload = match srtp.decrypt_rtp(buf) {
            Ok(p) => p,
            Err(e) => {
                warn!("dropping undecryptable rtp packet: {e}");
                return Ok(());
            }
        };
        self.handler.on_track(&payload);
        Ok(())
    }
}

impl Drop for PeerConnection {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
