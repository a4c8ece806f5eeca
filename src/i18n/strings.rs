/// All localized user-facing strings for a language
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Lead Capture ====================
    /// Contact form submitted without name, email or phone
    pub contact_required_fields: &'static str,

    /// Email present but not syntactically valid
    pub invalid_email: &'static str,

    /// Contact form accepted
    pub contact_success: &'static str,

    /// Quick consultation submitted with neither phone nor email
    pub quick_consultation_required: &'static str,

    /// Quick consultation accepted
    pub quick_consultation_success: &'static str,

    /// Unexpected failure while handling a lead
    pub lead_processing_error: &'static str,

    // ==================== Admin ====================
    /// Wrong admin password
    pub admin_login_invalid: &'static str,

    /// Missing, unknown or expired session token
    pub admin_session_required: &'static str,

    /// Content document stored
    pub admin_content_saved: &'static str,

    /// Publish failed
    pub admin_deploy_failed: &'static str,

    // ==================== Adventure ====================
    /// Action request without a command
    pub adventure_command_required: &'static str,

    /// Opening scene could not be generated
    pub adventure_start_failed: &'static str,

    /// Player action could not be processed
    pub adventure_action_failed: &'static str,
}

// ==================== Russian Strings ====================

/// Russian language strings (canonical)
pub const RUSSIAN_STRINGS: LanguageStrings = LanguageStrings {
    // Lead capture
    contact_required_fields: "Пожалуйста, заполните все обязательные поля",
    invalid_email: "Пожалуйста, введите корректный email",
    contact_success: "Заявка успешно получена! Мы свяжемся с вами в ближайшее время.",
    quick_consultation_required: "Пожалуйста, заполните номер телефона или email",
    quick_consultation_success: "Заявка принята! Менеджер свяжется с вами в ближайшее время.",
    lead_processing_error: "Произошла ошибка при обработке заявки",

    // Admin
    admin_login_invalid: "Неверный пароль",
    admin_session_required: "Требуется авторизация",
    admin_content_saved: "Контент сохранён",
    admin_deploy_failed: "Не удалось опубликовать изменения",

    // Adventure
    adventure_command_required: "Требуется команда",
    adventure_start_failed: "Не удалось начать приключение. Попробуйте ещё раз.",
    adventure_action_failed: "Не удалось обработать действие. Попробуйте ещё раз.",
};

// ==================== English Strings ====================

/// English language strings
pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    // Lead capture
    contact_required_fields: "Please fill in all required fields",
    invalid_email: "Please enter a valid email",
    contact_success: "Request received! We will contact you shortly.",
    quick_consultation_required: "Please enter a phone number or email",
    quick_consultation_success: "Request accepted! A manager will contact you shortly.",
    lead_processing_error: "An error occurred while processing your request",

    // Admin
    admin_login_invalid: "Invalid password",
    admin_session_required: "Authorization required",
    admin_content_saved: "Content saved",
    admin_deploy_failed: "Failed to deploy changes",

    // Adventure
    adventure_command_required: "Command is required",
    adventure_start_failed: "Failed to start adventure. Please try again.",
    adventure_action_failed: "Failed to process action. Please try again.",
};
