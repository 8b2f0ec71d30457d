//! Localized messages for gateway response codes.
//!
//! Each command has its own code vocabulary, so lookups are keyed by
//! [`MessageTable`]. Unknown codes fall back to the table's generic error.

use crate::Locale;

/// Which code vocabulary a response code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTable {
    /// `vnp_ResponseCode` on return URLs and IPN calls
    PaymentReturn,
    /// `vnp_ResponseCode` of a querydr response
    QueryDr,
    /// `vnp_ResponseCode` of a refund response
    Refund,
    /// `vnp_TransactionStatus`
    TransactionStatus,
}

pub fn wrong_checksum_message(locale: Locale) -> &'static str {
    match locale {
        Locale::Vn => "Sai checksum",
        Locale::En => "Wrong checksum",
    }
}

pub fn response_message(table: MessageTable, code: &str, locale: Locale) -> &'static str {
    let (vn, en) = match table {
        MessageTable::PaymentReturn => payment_return(code),
        MessageTable::QueryDr => query_dr(code),
        MessageTable::Refund => refund(code),
        MessageTable::TransactionStatus => transaction_status(code),
    };
    match locale {
        Locale::Vn => vn,
        Locale::En => en,
    }
}

fn payment_return(code: &str) -> (&'static str, &'static str) {
    match code {
        "00" => ("Giao dịch thành công", "Transaction successful"),
        "07" => (
            "Trừ tiền thành công. Giao dịch bị nghi ngờ (liên quan tới lừa đảo, giao dịch bất thường)",
            "Amount deducted successfully. Transaction is suspected (fraud or unusual activity)",
        ),
        "09" => (
            "Giao dịch không thành công do: Thẻ/Tài khoản của khách hàng chưa đăng ký dịch vụ InternetBanking tại ngân hàng",
            "Transaction failed: the customer's card/account is not registered for Internet Banking",
        ),
        "10" => (
            "Giao dịch không thành công do: Khách hàng xác thực thông tin thẻ/tài khoản không đúng quá 3 lần",
            "Transaction failed: card/account authentication failed more than 3 times",
        ),
        "11" => (
            "Giao dịch không thành công do: Đã hết hạn chờ thanh toán",
            "Transaction failed: payment timed out",
        ),
        "12" => (
            "Giao dịch không thành công do: Thẻ/Tài khoản của khách hàng bị khóa",
            "Transaction failed: the customer's card/account is locked",
        ),
        "13" => (
            "Giao dịch không thành công do: Quý khách nhập sai mật khẩu xác thực giao dịch (OTP)",
            "Transaction failed: wrong one-time password (OTP)",
        ),
        "24" => (
            "Giao dịch không thành công do: Khách hàng hủy giao dịch",
            "Transaction failed: cancelled by the customer",
        ),
        "51" => (
            "Giao dịch không thành công do: Tài khoản của quý khách không đủ số dư để thực hiện giao dịch",
            "Transaction failed: insufficient balance",
        ),
        "65" => (
            "Giao dịch không thành công do: Tài khoản của Quý khách đã vượt quá hạn mức giao dịch trong ngày",
            "Transaction failed: daily transaction limit exceeded",
        ),
        "75" => (
            "Ngân hàng thanh toán đang bảo trì",
            "The paying bank is under maintenance",
        ),
        "79" => (
            "Giao dịch không thành công do: KH nhập sai mật khẩu thanh toán quá số lần quy định",
            "Transaction failed: payment password entered wrongly too many times",
        ),
        _ => ("Lỗi không xác định", "Unknown error"),
    }
}

fn query_dr(code: &str) -> (&'static str, &'static str) {
    match code {
        "00" => ("Yêu cầu thành công", "Request successful"),
        "02" => (
            "Mã định danh kết nối không hợp lệ (kiểm tra lại TmnCode)",
            "Invalid merchant code (check TmnCode)",
        ),
        "03" => (
            "Dữ liệu gửi sang không đúng định dạng",
            "Request data has an invalid format",
        ),
        "91" => ("Không tìm thấy giao dịch yêu cầu", "Transaction not found"),
        "94" => (
            "Yêu cầu trùng lặp trong thời gian giới hạn của API",
            "Duplicate request within the API time limit",
        ),
        "97" => ("Checksum không hợp lệ", "Invalid checksum"),
        _ => ("Các lỗi khác", "Other error"),
    }
}

fn refund(code: &str) -> (&'static str, &'static str) {
    match code {
        "00" => ("Yêu cầu thành công", "Request successful"),
        "02" => (
            "Mã định danh kết nối không hợp lệ (kiểm tra lại TmnCode)",
            "Invalid merchant code (check TmnCode)",
        ),
        "03" => (
            "Dữ liệu gửi sang không đúng định dạng",
            "Request data has an invalid format",
        ),
        "04" => (
            "Không cho phép hoàn trả toàn phần sau khi hoàn trả một phần",
            "Full refund is not allowed after a partial refund",
        ),
        "13" => (
            "Chỉ cho phép hoàn trả một phần",
            "Only partial refunds are allowed",
        ),
        "91" => (
            "Không tìm thấy giao dịch yêu cầu hoàn trả",
            "Refund transaction not found",
        ),
        "93" => (
            "Số tiền hoàn trả không hợp lệ",
            "Invalid refund amount",
        ),
        "94" => (
            "Giao dịch đã được gửi yêu cầu hoàn tiền trước đó và đang được xử lý",
            "A refund request for this transaction is already being processed",
        ),
        "95" => (
            "Giao dịch này không thành công bên VNPAY. VNPAY từ chối xử lý yêu cầu",
            "The transaction failed at VNPAY; the refund was rejected",
        ),
        "97" => ("Checksum không hợp lệ", "Invalid checksum"),
        _ => ("Các lỗi khác", "Other error"),
    }
}

fn transaction_status(code: &str) -> (&'static str, &'static str) {
    match code {
        "00" => ("Giao dịch thanh toán thành công", "Payment transaction successful"),
        "01" => ("Giao dịch chưa hoàn tất", "Transaction pending"),
        "02" => ("Giao dịch bị lỗi", "Transaction error"),
        "04" => (
            "Giao dịch đảo (Khách hàng đã bị trừ tiền tại Ngân hàng nhưng GD chưa thành công ở VNPAY)",
            "Reversed transaction (customer was charged by the bank but the payment did not complete)",
        ),
        "05" => (
            "VNPAY đang xử lý giao dịch này (GD hoàn tiền)",
            "VNPAY is processing this refund",
        ),
        "06" => (
            "VNPAY đã gửi yêu cầu hoàn tiền sang Ngân hàng (GD hoàn tiền)",
            "VNPAY has sent the refund request to the bank",
        ),
        "07" => ("Giao dịch bị nghi ngờ gian lận", "Transaction suspected of fraud"),
        "09" => ("GD Hoàn trả bị từ chối", "Refund rejected"),
        _ => ("Không xác định", "Unknown status"),
    }
}
