//! The shipped template catalog.
//!
//! Translator-owned strings. The four highest-volume types carry full
//! Kannada/Hindi/Tamil/Telugu variants; the remaining types ship English
//! only and rely on the engine's language fallback until translations land.

use mandilink_shared::events::{Language, NotificationType};

use super::engine::TemplateEngine;

/// Register the default catalog into an engine
pub(crate) fn install(engine: &mut TemplateEngine) {
    use Language::*;
    use NotificationType::*;

    // ==================== Order matched ====================
    engine.register_template(
        OrderMatched,
        English,
        "🎉 New buyer matched!",
        "New buyer for your {{crop}}: {{quantity}} kg at ₹{{price}}/kg. Total ₹{{total}}. Open the app to confirm.",
    );
    engine.register_template(
        OrderMatched,
        Kannada,
        "🎉 ಖರೀದಿದಾರ ಹೊಂದಾಣಿಕೆ ಆಗಿದೆ!",
        "ನಿಮ್ಮ {{crop}} ಗೆ ಹೊಸ ಖರೀದಿದಾರ: {{quantity}} ಕೆಜಿ, ₹{{price}}/ಕೆಜಿ. ಒಟ್ಟು ₹{{total}}. ದೃಢೀಕರಿಸಲು ಆ್ಯಪ್ ತೆರೆಯಿರಿ.",
    );
    engine.register_template(
        OrderMatched,
        Hindi,
        "🎉 नया खरीदार मिला!",
        "आपकी {{crop}} के लिए नया खरीदार: {{quantity}} किलो, ₹{{price}}/किलो। कुल ₹{{total}}। पुष्टि के लिए ऐप खोलें।",
    );
    engine.register_template(
        OrderMatched,
        Tamil,
        "🎉 புதிய வாங்குபவர் பொருந்தினார்!",
        "உங்கள் {{crop}}க்கு புதிய வாங்குபவர்: {{quantity}} கிலோ, ₹{{price}}/கிலோ. மொத்தம் ₹{{total}}. உறுதிப்படுத்த ஆப்பைத் திறக்கவும்.",
    );
    engine.register_template(
        OrderMatched,
        Telugu,
        "🎉 కొత్త కొనుగోలుదారు దొరికారు!",
        "మీ {{crop}} కి కొత్త కొనుగోలుదారు: {{quantity}} కిలోలు, ₹{{price}}/కిలో. మొత్తం ₹{{total}}. నిర్ధారించడానికి యాప్ తెరవండి.",
    );

    // ==================== Payment received ====================
    engine.register_template(
        PaymentReceived,
        English,
        "💰 Payment received",
        "₹{{amount}} received for order {{order_id}}. It will reflect in your account shortly.",
    );
    engine.register_template(
        PaymentReceived,
        Kannada,
        "💰 ಹಣ ಸ್ವೀಕರಿಸಲಾಗಿದೆ",
        "ಆರ್ಡರ್ {{order_id}} ಗಾಗಿ ₹{{amount}} ಸ್ವೀಕರಿಸಲಾಗಿದೆ. ಶೀಘ್ರದಲ್ಲೇ ನಿಮ್ಮ ಖಾತೆಯಲ್ಲಿ ಕಾಣಿಸುತ್ತದೆ.",
    );
    engine.register_template(
        PaymentReceived,
        Hindi,
        "💰 भुगतान प्राप्त हुआ",
        "ऑर्डर {{order_id}} के लिए ₹{{amount}} प्राप्त हुआ। जल्द ही आपके खाते में दिखेगा।",
    );
    engine.register_template(
        PaymentReceived,
        Tamil,
        "💰 பணம் பெறப்பட்டது",
        "ஆர்டர் {{order_id}}க்கு ₹{{amount}} பெறப்பட்டது. விரைவில் உங்கள் கணக்கில் காண்பிக்கப்படும்.",
    );
    engine.register_template(
        PaymentReceived,
        Telugu,
        "💰 చెల్లింపు అందింది",
        "ఆర్డర్ {{order_id}} కోసం ₹{{amount}} అందింది. త్వరలో మీ ఖాతాలో కనిపిస్తుంది.",
    );

    // ==================== Match expiring ====================
    engine.register_template(
        MatchExpiring,
        English,
        "⏰ Offer expiring soon",
        "Your buyer match for {{crop}} expires in {{hours}} hours. Confirm now to keep it.",
    );
    engine.register_template(
        MatchExpiring,
        Kannada,
        "⏰ ಆಫರ್ ಶೀಘ್ರದಲ್ಲೇ ಮುಗಿಯಲಿದೆ",
        "ನಿಮ್ಮ {{crop}} ಖರೀದಿದಾರ ಹೊಂದಾಣಿಕೆ {{hours}} ಗಂಟೆಗಳಲ್ಲಿ ಮುಗಿಯುತ್ತದೆ. ಉಳಿಸಿಕೊಳ್ಳಲು ಈಗಲೇ ದೃಢೀಕರಿಸಿ.",
    );
    engine.register_template(
        MatchExpiring,
        Hindi,
        "⏰ ऑफ़र जल्द समाप्त होगा",
        "आपकी {{crop}} की खरीदार मैच {{hours}} घंटे में समाप्त होगी। बनाए रखने के लिए अभी पुष्टि करें।",
    );
    engine.register_template(
        MatchExpiring,
        Tamil,
        "⏰ சலுகை விரைவில் முடிவடையும்",
        "உங்கள் {{crop}} வாங்குபவர் பொருத்தம் {{hours}} மணி நேரத்தில் முடிவடையும். வைத்திருக்க இப்போதே உறுதிப்படுத்தவும்.",
    );
    engine.register_template(
        MatchExpiring,
        Telugu,
        "⏰ ఆఫర్ త్వరలో ముగుస్తుంది",
        "మీ {{crop}} కొనుగోలుదారు మ్యాచ్ {{hours}} గంటల్లో ముగుస్తుంది. ఉంచుకోవడానికి ఇప్పుడే నిర్ధారించండి.",
    );

    // ==================== Order cancelled ====================
    engine.register_template(
        OrderCancelled,
        English,
        "Order cancelled",
        "Order {{order_id}} for {{crop}} was cancelled. Reason: {{reason}}.",
    );
    engine.register_template(
        OrderCancelled,
        Kannada,
        "ಆರ್ಡರ್ ರದ್ದಾಗಿದೆ",
        "{{crop}} ಗಾಗಿ ಆರ್ಡರ್ {{order_id}} ರದ್ದಾಗಿದೆ. ಕಾರಣ: {{reason}}.",
    );
    engine.register_template(
        OrderCancelled,
        Hindi,
        "ऑर्डर रद्द हुआ",
        "{{crop}} का ऑर्डर {{order_id}} रद्द हो गया। कारण: {{reason}}।",
    );
    engine.register_template(
        OrderCancelled,
        Tamil,
        "ஆர்டர் ரத்து செய்யப்பட்டது",
        "{{crop}}க்கான ஆர்டர் {{order_id}} ரத்து செய்யப்பட்டது. காரணம்: {{reason}}.",
    );
    engine.register_template(
        OrderCancelled,
        Telugu,
        "ఆర్డర్ రద్దు చేయబడింది",
        "{{crop}} కోసం ఆర్డర్ {{order_id}} రద్దు చేయబడింది. కారణం: {{reason}}.",
    );

    // ==================== English-only types ====================
    engine.register_template(
        QualityDispute,
        English,
        "⚠️ Quality dispute raised",
        "A quality issue was reported on order {{order_id}}. Please respond in the app within 24 hours.",
    );
    engine.register_template(
        HaulerEnRoute,
        English,
        "🚛 Hauler on the way",
        "{{hauler_name}} is on the way to pick up your {{crop}}. Expected arrival {{eta}}.",
    );
    engine.register_template(
        PickupComplete,
        English,
        "✅ Pickup complete",
        "Your {{crop}} ({{quantity}} kg) was picked up. Track the delivery in the app.",
    );
    engine.register_template(
        OrderDelivered,
        English,
        "📦 Order delivered",
        "Order {{order_id}} was delivered to the buyer. Payment is being processed.",
    );
    engine.register_template(
        DropPointAssigned,
        English,
        "📍 Drop point assigned",
        "Bring your {{crop}} to {{drop_point}} by {{deadline}}.",
    );
    engine.register_template(
        CropAdvisory,
        English,
        "🌾 Crop advisory",
        "{{advisory}}",
    );
}
