//! Property tests for the wire forms and bus delivery rules.

use proptest::prelude::*;
use snnk_core::messaging::{from_bytes, to_bytes};
use snnk_core::{
    MessageBus, MessageHeader, OutputType, SpikeMessage, SynapticImpact, SynapticImpactMessage, Uid,
};

fn output_type() -> impl Strategy<Value = OutputType> {
    prop_oneof![
        Just(OutputType::Excitatory),
        Just(OutputType::InhibitoryCurrent),
        Just(OutputType::Dopamine),
        Just(OutputType::Blocking),
    ]
}

fn impact() -> impl Strategy<Value = SynapticImpact> {
    (any::<u64>(), -1.0e6f32..1.0e6, output_type(), any::<u32>(), any::<u32>()).prop_map(
        |(connection_index, impact_value, synapse_type, pre, post)| SynapticImpact {
            connection_index,
            impact_value,
            synapse_type,
            presynaptic_neuron_index: pre,
            postsynaptic_neuron_index: post,
        },
    )
}

fn impact_message() -> impl Strategy<Value = SynapticImpactMessage> {
    (
        any::<u128>(),
        any::<u64>(),
        any::<u128>(),
        any::<u128>(),
        any::<bool>(),
        proptest::collection::vec(impact(), 0..16),
    )
        .prop_map(|(sender, time, pre, post, is_forcing, impacts)| SynapticImpactMessage {
            header: MessageHeader::new(Uid::from_u128(sender), time),
            presynaptic_population_uid: Uid::from_u128(pre),
            postsynaptic_population_uid: Uid::from_u128(post),
            is_forcing,
            impacts,
        })
}

proptest! {
    #[test]
    fn prop_spike_message_text_and_binary(
        sender in any::<u128>(),
        time in any::<u64>(),
        indexes in proptest::collection::vec(any::<u32>(), 0..64),
    ) {
        let message = SpikeMessage::new(MessageHeader::new(Uid::from_u128(sender), time), indexes);

        let parsed: SpikeMessage = message.to_string().parse().unwrap();
        prop_assert_eq!(&parsed, &message);

        let decoded: SpikeMessage = from_bytes(&to_bytes(&message).unwrap()).unwrap();
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn prop_impact_message_text_and_binary(message in impact_message()) {
        let parsed: SynapticImpactMessage = message.to_string().parse().unwrap();
        prop_assert_eq!(&parsed, &message);

        let decoded: SynapticImpactMessage = from_bytes(&to_bytes(&message).unwrap()).unwrap();
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn prop_truncated_binary_is_rejected(message in impact_message(), cut in 1usize..8) {
        let bytes = to_bytes(&message).unwrap();
        let cut = cut.min(bytes.len());
        prop_assert!(from_bytes::<SynapticImpactMessage>(&bytes[..bytes.len() - cut]).is_err());
    }

    #[test]
    fn prop_truncated_text_is_rejected(
        indexes in proptest::collection::vec(any::<u32>(), 1..16),
    ) {
        let message = SpikeMessage::new(MessageHeader::new(Uid::from_u128(7), 3), indexes);
        let text = message.to_string();
        let truncated = text.rsplit_once(' ').map(|(head, _)| head).unwrap();
        prop_assert!(truncated.parse::<SpikeMessage>().is_err());
    }

    /// Each subscription receives exactly the messages of its allow-list,
    /// in send order, whatever the interleaving of senders.
    #[test]
    fn prop_subscription_filters_and_keeps_order(
        senders in proptest::collection::vec(0u128..6, 0..64),
        allowed in proptest::collection::btree_set(0u128..6, 0..6),
    ) {
        let bus = MessageBus::new();
        let mut endpoint = bus.create_endpoint();
        let receiver = Uid::from_u128(1000);
        endpoint.subscribe_spikes(receiver, allowed.iter().map(|&s| Uid::from_u128(s)));

        for (time, &sender) in senders.iter().enumerate() {
            endpoint.send_message(SpikeMessage::new(
                MessageHeader::new(Uid::from_u128(sender), time as u64),
                vec![sender as u32],
            ));
        }
        prop_assert_eq!(bus.route_messages(), senders.len());
        prop_assert_eq!(endpoint.receive_all_messages(), senders.len());

        let received: Vec<(u128, u64)> = endpoint
            .unload_messages::<SpikeMessage>(receiver)
            .iter()
            .map(|m| (m.header.sender_uid.as_u128(), m.header.send_time))
            .collect();
        let expected: Vec<(u128, u64)> = senders
            .iter()
            .enumerate()
            .filter(|(_, s)| allowed.contains(s))
            .map(|(time, &s)| (s, time as u64))
            .collect();
        prop_assert_eq!(received, expected);
    }
}
